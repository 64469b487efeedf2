//! Field access on raw entity objects.
//!
//! Raw entities are loosely typed: the same field may arrive as a JSON
//! string or a JSON number depending on the entity. These helpers read a
//! field the way classification needs it and report absence as `None`.

use serde_json::{Map, Value};

use crate::entity::CommonFields;

/// One JSON object from an entity array, keys in document order
pub type RawEntityObject = Map<String, Value>;

pub const CONFIDENCE: &str = "confidence";
pub const VALUE: &str = "value";
pub const TYPE: &str = "type";

/// Fields read into [`CommonFields`] rather than kept as extras
pub const COMMON_FIELDS: [&str; 3] = [CONFIDENCE, VALUE, TYPE];

pub fn has_field(raw: &RawEntityObject, field: &str) -> bool {
    raw.get(field).map_or(false, |v| !v.is_null())
}

/// Read a scalar field as text. Numbers keep their literal decimal form.
pub fn text_field(raw: &RawEntityObject, field: &str) -> Option<String> {
    raw.get(field).and_then(scalar_text)
}

pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn string_field<'a>(raw: &'a RawEntityObject, field: &str) -> Option<&'a str> {
    raw.get(field).and_then(Value::as_str)
}

pub fn bool_field(raw: &RawEntityObject, field: &str) -> Option<bool> {
    raw.get(field).and_then(Value::as_bool)
}

pub fn object_field<'a>(raw: &'a RawEntityObject, field: &str) -> Option<&'a RawEntityObject> {
    raw.get(field).and_then(Value::as_object)
}

/// Confidence may come as a number or, from some clients, a numeric string.
/// Non-finite values are dropped.
pub fn confidence_field(raw: &RawEntityObject) -> Option<f64> {
    let confidence = match raw.get(CONFIDENCE)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    confidence.filter(|c| c.is_finite())
}

impl CommonFields {
    pub fn from_raw(raw: &RawEntityObject) -> Self {
        Self {
            confidence: confidence_field(raw),
            value: text_field(raw, VALUE),
            entity_type: text_field(raw, TYPE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawEntityObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_common_fields_from_raw() {
        let obj = raw(json!({"confidence": 0.914, "value": "weather", "type": "value"}));
        let common = CommonFields::from_raw(&obj);

        assert_eq!(common.confidence, Some(0.914));
        assert_eq!(common.value.as_deref(), Some("weather"));
        assert_eq!(common.entity_type.as_deref(), Some("value"));
    }

    #[test]
    fn test_numeric_value_keeps_literal_text() {
        let obj: RawEntityObject = serde_json::from_str(r#"{"value": 4.56, "count": 3000}"#).unwrap();

        assert_eq!(text_field(&obj, "value").as_deref(), Some("4.56"));
        assert_eq!(text_field(&obj, "count").as_deref(), Some("3000"));
    }

    #[test]
    fn test_missing_and_null_fields() {
        let obj = raw(json!({"value": null}));

        assert!(!has_field(&obj, "value"));
        assert!(!has_field(&obj, "grain"));
        assert_eq!(CommonFields::from_raw(&obj), CommonFields::default());
    }

    #[test]
    fn test_confidence_from_string() {
        let obj = raw(json!({"confidence": "0.5"}));
        assert_eq!(confidence_field(&obj), Some(0.5));
    }

    #[test]
    fn test_non_finite_confidence_is_dropped() {
        for text in ["NaN", "inf", "-infinity"] {
            let obj = raw(json!({"confidence": text, "value": "x"}));
            assert_eq!(confidence_field(&obj), None, "{}", text);
            assert_eq!(CommonFields::from_raw(&obj), CommonFields::from_raw(&obj));
        }
    }
}
