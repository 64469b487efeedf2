//! Structural entity classification.
//!
//! The provider does not say which shape an entity object has, and the key
//! an entity array appears under is chosen freely (a custom entity may be
//! called "datetime", a datetime may come under "intend"). Classification is
//! therefore done on field presence alone: each known shape has a signature,
//! signatures are tried in a fixed priority order and the first match wins.
//! Objects matching no signature become [`Custom`] entities.

pub mod config;
pub mod signature;

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::entity::{
    AmountOfMoney, CommonFields, Custom, Datetime, DatetimeBound, Distance, Duration, Email,
    EntityKind, Greetings, Intent, NlpEntity, PhoneNumber, Quantity, Reminder, Temperature,
    Volume,
};
use crate::error::{ConfigError, NormalizeError};
use crate::normalizer::{normalize_str, DurationUnit};

pub use config::ClassifierConfig;
pub use signature::RawEntityObject;

use signature::{
    bool_field, has_field, object_field, string_field, text_field, COMMON_FIELDS,
};

/// Signatures in the order they are tried
pub const PRIORITY: [EntityKind; 12] = [
    EntityKind::Duration,
    EntityKind::Datetime,
    EntityKind::Reminder,
    EntityKind::AmountOfMoney,
    EntityKind::Temperature,
    EntityKind::Distance,
    EntityKind::Volume,
    EntityKind::Quantity,
    EntityKind::Greetings,
    EntityKind::Email,
    EntityKind::PhoneNumber,
    EntityKind::Intent,
];

static DEFAULT_REGISTRY: Lazy<EntityRegistry> = Lazy::new(EntityRegistry::default);

/// Shared registry built from [`ClassifierConfig::default`]
pub fn default_registry() -> &'static EntityRegistry {
    &DEFAULT_REGISTRY
}

/// Outcome of testing one signature against a raw object
enum Signature {
    NoMatch,
    Matched(NlpEntity),
    /// The object has the shape but its content is unusable
    Degraded(NormalizeError),
}

/// Classifies raw entity objects into [`NlpEntity`] values.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    config: ClassifierConfig,
    currencies: HashSet<String>,
    temperature_units: HashSet<String>,
    distance_units: HashSet<String>,
    volume_units: HashSet<String>,
    email: Regex,
    phone: Regex,
}

impl EntityRegistry {
    /// Build a registry from a configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidPattern`] if the email or phone pattern
    /// does not compile.
    pub fn with_config(config: ClassifierConfig) -> Result<Self, ConfigError> {
        let email = Regex::new(&config.email_pattern)?;
        let phone = Regex::new(&config.phone_pattern)?;

        Ok(Self {
            currencies: lowercase_set(&config.currencies),
            temperature_units: lowercase_set(&config.temperature_units),
            distance_units: lowercase_set(&config.distance_units),
            volume_units: lowercase_set(&config.volume_units),
            email,
            phone,
            config,
        })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one raw entity object.
    ///
    /// `source_tag` is the key the object was found under. It never decides
    /// the variant; it is only recorded on intents and custom entities.
    /// Classification is total: anything unrecognized becomes [`Custom`].
    pub fn classify(&self, raw: &RawEntityObject, source_tag: &str) -> NlpEntity {
        let common = CommonFields::from_raw(raw);

        for kind in PRIORITY {
            match self.try_signature(kind, raw, &common, source_tag) {
                Signature::NoMatch => continue,
                Signature::Matched(entity) => {
                    tracing::trace!(source_tag, kind = %entity.kind(), "classified entity");
                    return entity;
                }
                Signature::Degraded(err) => {
                    tracing::debug!(
                        source_tag,
                        kind = %kind,
                        error = %err,
                        "entity degraded to custom"
                    );
                    break;
                }
            }
        }

        NlpEntity::Custom(custom(raw, common, source_tag))
    }

    /// Kind `raw` would be classified as
    pub fn kind_of(&self, raw: &RawEntityObject) -> EntityKind {
        self.classify(raw, "").kind()
    }

    fn try_signature(
        &self,
        kind: EntityKind,
        raw: &RawEntityObject,
        common: &CommonFields,
        source_tag: &str,
    ) -> Signature {
        let unit = string_field(raw, "unit");
        let in_family = |family: &HashSet<String>| {
            unit.map_or(false, |u| family.contains(&u.to_lowercase()))
        };
        let value = common.value.as_deref();

        let entity: NlpEntity = match kind {
            EntityKind::Duration => return duration(raw, common),
            EntityKind::Datetime => match datetime(raw, common) {
                Some(datetime) => datetime.into(),
                None => return Signature::NoMatch,
            },
            EntityKind::Reminder => match bool_field(raw, "suggested") {
                Some(suggested) => Reminder {
                    common: common.clone(),
                    suggested,
                }
                .into(),
                None => return Signature::NoMatch,
            },
            EntityKind::AmountOfMoney if in_family(&self.currencies) => AmountOfMoney {
                common: common.clone(),
                unit: unit.unwrap_or_default().to_string(),
            }
            .into(),
            EntityKind::Temperature if in_family(&self.temperature_units) => Temperature {
                common: common.clone(),
                unit: unit.unwrap_or_default().to_string(),
            }
            .into(),
            EntityKind::Distance if in_family(&self.distance_units) => Distance {
                common: common.clone(),
                unit: unit.unwrap_or_default().to_string(),
            }
            .into(),
            EntityKind::Volume if in_family(&self.volume_units) => Volume {
                common: common.clone(),
                unit: unit.unwrap_or_default().to_string(),
            }
            .into(),
            EntityKind::Quantity if unit.is_some() => Quantity {
                common: common.clone(),
                unit: unit.unwrap_or_default().to_string(),
            }
            .into(),
            EntityKind::Greetings
                if matches!(value, Some("true") | Some("false"))
                    && common.entity_type.is_none() =>
            {
                Greetings {
                    common: common.clone(),
                }
                .into()
            }
            EntityKind::Email if value.map_or(false, |v| self.email.is_match(v)) => Email {
                common: common.clone(),
            }
            .into(),
            EntityKind::PhoneNumber if value.map_or(false, |v| self.is_phone_number(v)) => {
                PhoneNumber {
                    common: common.clone(),
                }
                .into()
            }
            EntityKind::Intent if string_field(raw, "type").is_some() && value.is_some() => {
                Intent {
                    common: common.clone(),
                    source_tag: source_tag.to_string(),
                }
                .into()
            }
            _ => return Signature::NoMatch,
        };

        Signature::Matched(entity)
    }

    fn is_phone_number(&self, value: &str) -> bool {
        let digits = value.chars().filter(char::is_ascii_digit).count();
        digits >= self.config.phone_min_digits && self.phone.is_match(value)
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        EntityRegistry::with_config(ClassifierConfig::default())
            .expect("built-in classifier patterns are valid")
    }
}

fn lowercase_set(values: &[String]) -> HashSet<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

fn duration(raw: &RawEntityObject, common: &CommonFields) -> Signature {
    let has_component = DurationUnit::ALL
        .iter()
        .any(|unit| has_field(raw, unit.as_str()));
    if !has_component {
        return Signature::NoMatch;
    }

    let unit = string_field(raw, "unit").unwrap_or_default().to_string();
    let value = common.value.clone().unwrap_or_default();
    let normalized = match normalize_str(&value, &unit) {
        Ok(normalized) => normalized,
        Err(err) => return Signature::Degraded(err),
    };

    let mut entity = Duration {
        common: common.clone(),
        unit,
        second: None,
        minute: None,
        hour: None,
        day: None,
        month: None,
        year: None,
        normalized,
    };
    for unit in DurationUnit::ALL {
        if let Some(component) = text_field(raw, unit.as_str()) {
            entity.set_component(unit, component);
        }
    }

    Signature::Matched(entity.into())
}

fn datetime(raw: &RawEntityObject, common: &CommonFields) -> Option<Datetime> {
    let grain = string_field(raw, "grain").map(str::to_string);
    let from = object_field(raw, "from").map(datetime_bound);
    let to = object_field(raw, "to").map(datetime_bound);

    let interval = common.entity_type.as_deref() == Some("interval")
        && (from.is_some() || to.is_some());
    if grain.is_none() && !interval {
        return None;
    }

    Some(Datetime {
        common: common.clone(),
        grain,
        from,
        to,
    })
}

fn datetime_bound(raw: &RawEntityObject) -> DatetimeBound {
    DatetimeBound {
        value: text_field(raw, "value"),
        grain: text_field(raw, "grain"),
    }
}

fn custom(raw: &RawEntityObject, common: CommonFields, source_tag: &str) -> Custom {
    let extra = raw
        .iter()
        .filter(|(field, _)| !COMMON_FIELDS.contains(&field.as_str()))
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect();

    Custom {
        common,
        source_tag: source_tag.to_string(),
        extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::DurationQuantity;
    use serde_json::{json, Value};

    fn raw(value: Value) -> RawEntityObject {
        value.as_object().cloned().unwrap()
    }

    fn classify(value: Value, tag: &str) -> NlpEntity {
        default_registry().classify(&raw(value), tag)
    }

    #[test]
    fn test_intent_keeps_source_tag() {
        let entity = classify(
            json!({"confidence": 0.914, "value": "weather", "type": "value"}),
            "intend",
        );

        let intent = entity.as_variant::<Intent>().unwrap();
        assert_eq!(intent.value(), Some("weather"));
        assert_eq!(intent.source_tag, "intend");
    }

    #[test]
    fn test_source_tag_does_not_choose_variant() {
        let entity = classify(
            json!({"confidence": 0.99, "value": "2017-08-02T00:00:00.000+02:00", "grain": "day", "type": "value"}),
            "intend",
        );
        assert_eq!(entity.kind(), EntityKind::Datetime);

        let entity = classify(json!({"confidence": 1.0, "value": "x"}), "datetime");
        assert_eq!(entity.kind(), EntityKind::Custom);
        assert_eq!(entity.source_tag(), Some("datetime"));
    }

    #[test]
    fn test_reminder_requires_boolean_suggested() {
        let entity = classify(
            json!({"confidence": 0.95, "value": "hallo!", "suggested": true, "type": "value"}),
            "reminder",
        );
        assert!(entity.as_variant::<Reminder>().unwrap().suggested);

        let entity = classify(
            json!({"value": "hallo!", "suggested": "yes"}),
            "reminder",
        );
        assert_eq!(entity.kind(), EntityKind::Custom);
    }

    #[test]
    fn test_unit_families() {
        let cases = [
            ("EUR", EntityKind::AmountOfMoney),
            ("$", EntityKind::AmountOfMoney),
            ("celsius", EntityKind::Temperature),
            ("kilometre", EntityKind::Distance),
            ("litre", EntityKind::Volume),
            ("gram", EntityKind::Quantity),
            ("cup", EntityKind::Quantity),
        ];

        for (unit, expected) in cases {
            let entity = classify(json!({"value": 3, "unit": unit, "type": "value"}), "x");
            assert_eq!(entity.kind(), expected, "unit {}", unit);
        }
    }

    #[test]
    fn test_amount_of_money_numeric_value() {
        let obj: RawEntityObject =
            serde_json::from_str(r#"{"confidence": 1, "value": 4.56, "unit": "EUR", "type": "value"}"#)
                .unwrap();
        let entity = default_registry().classify(&obj, "amount_of_money");

        let money = entity.as_variant::<AmountOfMoney>().unwrap();
        assert_eq!(money.value(), Some("4.56"));
        assert_eq!(money.unit, "EUR");
        assert_eq!(money.confidence(), Some(1.0));
    }

    #[test]
    fn test_greetings_email_phone() {
        let greetings = classify(json!({"confidence": 0.9998, "value": "true"}), "greetings");
        assert!(greetings.as_variant::<Greetings>().unwrap().is_greeting());

        let email = classify(json!({"confidence": 0.96, "value": "test@emaple.org"}), "email");
        assert_eq!(email.kind(), EntityKind::Email);

        let phone = classify(json!({"confidence": 0.96, "value": "12345654321"}), "phone_number");
        assert_eq!(phone.kind(), EntityKind::PhoneNumber);

        let phone = classify(json!({"value": "+49 (30) 123-4567"}), "phone_number");
        assert_eq!(phone.kind(), EntityKind::PhoneNumber);

        let short = classify(json!({"value": "2017"}), "year");
        assert_eq!(short.kind(), EntityKind::Custom);
    }

    #[test]
    fn test_duration_normalized() {
        let entity = classify(
            json!({"confidence": 1, "minute": 2, "value": 2, "unit": "minute", "type": "value"}),
            "duration",
        );

        let duration = entity.as_variant::<Duration>().unwrap();
        assert_eq!(duration.value(), Some("2"));
        assert_eq!(duration.minute.as_deref(), Some("2"));
        assert_eq!(duration.normalized, DurationQuantity::new("120", "second"));
    }

    #[test]
    fn test_duration_with_unknown_unit_degrades() {
        let entity = classify(
            json!({"confidence": 1, "day": 14, "value": 2, "unit": "fortnight"}),
            "duration",
        );

        let custom = entity.as_variant::<Custom>().unwrap();
        assert_eq!(custom.source_tag, "duration");
        assert_eq!(custom.get("unit"), Some(&json!("fortnight")));
        assert_eq!(custom.get("day"), Some(&json!(14)));
        assert_eq!(custom.value(), Some("2"));
    }

    #[test]
    fn test_datetime_interval() {
        let entity = classify(
            json!({
                "confidence": 0.97,
                "type": "interval",
                "from": {"value": "2017-08-02T18:00:00.000+02:00", "grain": "hour"},
                "to": {"value": "2017-08-03T00:00:00.000+02:00", "grain": "hour"}
            }),
            "datetime",
        );

        let datetime = entity.as_variant::<Datetime>().unwrap();
        assert!(datetime.is_interval());
        assert_eq!(datetime.grain, None);
        let from = datetime.from.as_ref().unwrap();
        assert_eq!(from.grain.as_deref(), Some("hour"));
        assert!(from.parse().is_some());
    }

    #[test]
    fn test_custom_keeps_extra_fields_in_order() {
        let entity = classify(
            json!({"confidence": 1.0, "value": "x", "_entity": "foobar", "meta": {"a": 1}}),
            "foobar",
        );

        let custom = entity.as_variant::<Custom>().unwrap();
        let fields: Vec<&str> = custom.extra.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["_entity", "meta"]);
        assert_eq!(custom.confidence(), Some(1.0));
    }

    #[test]
    fn test_metadata_does_not_affect_classification() {
        let obj = raw(json!({"value": "true", "_entity": "greetings", "_body": "hi"}));
        assert_eq!(default_registry().kind_of(&obj), EntityKind::Greetings);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let obj = raw(json!({"confidence": 0.96, "value": "20", "unit": "kilometre", "type": "value"}));
        let registry = default_registry();

        assert_eq!(registry.classify(&obj, "distance"), registry.classify(&obj, "distance"));
    }

    #[test]
    fn test_custom_config_vocabulary() {
        let config = ClassifierConfig::from_yaml_str("volume_units: [cup]\n").unwrap();
        let registry = EntityRegistry::with_config(config).unwrap();

        let obj = raw(json!({"value": 2, "unit": "cup"}));
        assert_eq!(registry.kind_of(&obj), EntityKind::Volume);
        assert_eq!(default_registry().kind_of(&obj), EntityKind::Quantity);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let config = ClassifierConfig {
            email_pattern: "([".to_string(),
            ..ClassifierConfig::default()
        };
        assert!(matches!(
            EntityRegistry::with_config(config),
            Err(ConfigError::InvalidPattern(_))
        ));
    }
}
