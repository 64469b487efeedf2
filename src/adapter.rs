//! Decoding of the `nlp` field into an [`NlpResult`].
//!
//! This is the seam the JSON deserializer calls. Decoding is total: any JSON
//! value produces a result, and anything that does not look like an entity
//! object ends up as a [`Custom`] entity rather than an error.
//!
//! A message envelope plugs it in through serde:
//!
//! ```
//! use nlpkit::NlpResult;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Message {
//!     text: String,
//!     #[serde(default)]
//!     nlp: NlpResult,
//! }
//!
//! let message: Message = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
//! assert!(message.nlp.is_empty());
//! ```
//!
//! Use `Option<NlpResult>` instead when the caller needs to tell "no
//! annotation" apart from "annotation without entities".

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::entity::{CommonFields, Custom, NlpEntity};
use crate::registry::signature::scalar_text;
use crate::registry::{default_registry, EntityRegistry};
use crate::result::NlpResult;

const ENTITIES_KEY: &str = "entities";

/// Decode an `nlp` value with the default registry
pub fn decode(nlp: Option<&Value>) -> NlpResult {
    decode_with(default_registry(), nlp)
}

/// Decode an `nlp` value.
///
/// An absent, null or non-object value yields an empty result. Messenger
/// wraps the entity map as `{"entities": {...}}`; both the wrapped and the
/// bare form are accepted. For each key, in document order, every element of
/// its array is classified with the key as source tag.
pub fn decode_with(registry: &EntityRegistry, nlp: Option<&Value>) -> NlpResult {
    let object = match nlp {
        Some(Value::Object(object)) => match object.get(ENTITIES_KEY) {
            Some(Value::Object(entities)) => entities,
            _ => object,
        },
        None | Some(Value::Null) => return NlpResult::default(),
        Some(other) => {
            tracing::debug!(found = json_type(other), "nlp field is not an object, ignoring");
            return NlpResult::default();
        }
    };

    let mut entities = Vec::new();
    for (key, occurrences) in object {
        match occurrences {
            Value::Array(items) => {
                entities.extend(items.iter().filter_map(|item| decode_item(registry, key, item)));
            }
            Value::Null => {}
            single => {
                tracing::debug!(
                    source_tag = key.as_str(),
                    found = json_type(single),
                    "entity key does not hold an array"
                );
                entities.extend(decode_item(registry, key, single));
            }
        }
    }

    NlpResult::new(entities)
}

fn decode_item(registry: &EntityRegistry, source_tag: &str, item: &Value) -> Option<NlpEntity> {
    match item {
        Value::Object(raw) => Some(registry.classify(raw, source_tag)),
        Value::Null => None,
        other => Some(NlpEntity::Custom(non_object_entity(source_tag, other))),
    }
}

/// Wrap a scalar or nested array that sits where an entity object should be
fn non_object_entity(source_tag: &str, item: &Value) -> Custom {
    let mut custom = Custom {
        common: CommonFields {
            value: scalar_text(item),
            ..CommonFields::default()
        },
        source_tag: source_tag.to_string(),
        extra: Default::default(),
    };
    if custom.common.value.is_none() {
        custom.extra.insert("value".to_string(), item.clone());
    }
    custom
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<'de> Deserialize<'de> for NlpResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(decode(raw.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Datetime, EntityKind, Intent, Reminder};
    use serde_json::json;

    #[test]
    fn test_absent_and_null() {
        assert!(decode(None).is_empty());
        assert!(decode(Some(&Value::Null)).is_empty());
        assert!(decode(Some(&json!({}))).is_empty());
    }

    #[test]
    fn test_wrapped_entities() {
        let wrapped = json!({"entities": {"foobar": [{"confidence": 1.0, "value": "x"}]}});
        let result = decode(Some(&wrapped));

        assert_eq!(result.len(), 1);
        assert_eq!(result.entities()[0].source_tag(), Some("foobar"));

        // A custom entity named "entities" is an array, not a wrapper
        let custom = json!({"entities": [{"value": "x"}]});
        assert_eq!(decode(Some(&custom)).entities()[0].source_tag(), Some("entities"));
    }

    #[test]
    fn test_non_object_nlp_is_empty() {
        assert!(decode(Some(&json!("garbage"))).is_empty());
        assert!(decode(Some(&json!([1, 2, 3]))).is_empty());
    }

    #[test]
    fn test_keys_in_document_order() {
        let nlp: Value = serde_json::from_str(
            r#"{
                "reminder": [{"confidence": 0.95, "value": "hallo!", "suggested": true, "type": "value"}],
                "datetime": [
                    {"confidence": 0.99, "value": "2017-08-02T00:00:00.000+02:00", "grain": "day", "type": "value"},
                    {"confidence": 0.5, "value": "2017-08-03T00:00:00.000+02:00", "grain": "day", "type": "value"}
                ],
                "intent": [{"confidence": 0.8, "value": "remind", "type": "value"}]
            }"#,
        )
        .unwrap();

        let result = decode(Some(&nlp));
        let kinds: Vec<EntityKind> = result.iter().map(NlpEntity::kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntityKind::Reminder,
                EntityKind::Datetime,
                EntityKind::Datetime,
                EntityKind::Intent
            ]
        );

        let datetimes = result.entities_of::<Datetime>();
        assert_eq!(datetimes[0].confidence(), Some(0.99));
        assert_eq!(datetimes[1].confidence(), Some(0.5));
        assert_eq!(result.entities_of::<Reminder>().len(), 1);
        assert_eq!(result.first_of::<Intent>().unwrap().source_tag, "intent");
    }

    #[test]
    fn test_garbage_key_degrades_to_custom() {
        let nlp = json!({
            "intend": [{"confidence": 0.914, "value": "weather", "type": "value"}],
            "broken": "not-an-array",
            "nested": [[1, 2]],
            "bare": {"confidence": 0.7, "value": "x"},
            "empty": null,
            "holes": [null]
        });

        let result = decode(Some(&nlp));
        assert_eq!(result.len(), 4);
        assert_eq!(result.entities()[0].kind(), EntityKind::Intent);

        let broken = &result.entities()[1];
        assert_eq!(broken.kind(), EntityKind::Custom);
        assert_eq!(broken.source_tag(), Some("broken"));
        assert_eq!(broken.value(), Some("not-an-array"));

        let nested = result.entities()[2].as_variant::<Custom>().unwrap();
        assert_eq!(nested.source_tag, "nested");
        assert_eq!(nested.get("value"), Some(&json!([1, 2])));

        assert_eq!(result.entities()[3].source_tag(), Some("bare"));
    }

    #[test]
    fn test_deserialize_impl() {
        let result: NlpResult = serde_json::from_str("null").unwrap();
        assert!(result.is_empty());

        let result: NlpResult =
            serde_json::from_str(r#"{"foobar":[{"confidence":1.0,"value":"x"}]}"#).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.entities()[0].source_tag(), Some("foobar"));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let result: Result<NlpResult, _> = serde_json::from_str(r#"{"intend": [{"#);
        assert!(result.is_err());
    }
}
