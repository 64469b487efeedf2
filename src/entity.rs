//! Decoded NLP entities.
//!
//! [`NlpEntity`] is a closed enum over the entity shapes the provider is
//! known to emit, plus [`Custom`] for everything else. Each variant wraps a
//! struct holding the fields every entity has ([`CommonFields`]) and the
//! fields specific to that shape.
//!
//! Narrowing to a concrete shape goes through the [`EntityVariant`] trait:
//!
//! ```
//! use nlpkit::entity::{Datetime, NlpEntity};
//! use nlpkit::EntityRegistry;
//! use serde_json::json;
//!
//! let raw = json!({"confidence": 0.99, "value": "2017-08-02T00:00:00.000+02:00", "grain": "day"});
//! let entity = EntityRegistry::default().classify(raw.as_object().unwrap(), "datetime");
//!
//! let datetime = entity.as_variant::<Datetime>().unwrap();
//! assert_eq!(datetime.grain.as_deref(), Some("day"));
//! ```

use std::fmt;

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NlpError;
use crate::normalizer::{DurationQuantity, DurationUnit};

/// Tag identifying the variant an entity was classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Intent,
    Datetime,
    Reminder,
    Greetings,
    AmountOfMoney,
    PhoneNumber,
    Email,
    Distance,
    Duration,
    Quantity,
    Temperature,
    Volume,
    Custom,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Intent => "intent",
            EntityKind::Datetime => "datetime",
            EntityKind::Reminder => "reminder",
            EntityKind::Greetings => "greetings",
            EntityKind::AmountOfMoney => "amount_of_money",
            EntityKind::PhoneNumber => "phone_number",
            EntityKind::Email => "email",
            EntityKind::Distance => "distance",
            EntityKind::Duration => "duration",
            EntityKind::Quantity => "quantity",
            EntityKind::Temperature => "temperature",
            EntityKind::Volume => "volume",
            EntityKind::Custom => "custom",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields present on every entity. Absent fields stay `None`, they are never
/// defaulted to zero or empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Sub-kind reported by the provider, e.g. "value" or "interval"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
}

/// Custom (wit.ai trained) entity such as an intent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intent {
    #[serde(flatten)]
    pub common: CommonFields,
    /// Key the entity array appeared under
    pub source_tag: String,
}

/// One end of a datetime interval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatetimeBound {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grain: Option<String>,
}

impl DatetimeBound {
    pub fn parse(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(self.value.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datetime {
    #[serde(flatten)]
    pub common: CommonFields,
    /// Granularity of the value, e.g. "day" or "hour"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<DatetimeBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<DatetimeBound>,
}

impl Datetime {
    /// Parse `value` as an RFC 3339 timestamp
    pub fn parse(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(self.common.value.as_deref())
    }

    pub fn is_interval(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<FixedOffset>> {
    value.and_then(|v| DateTime::parse_from_rfc3339(v).ok())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    #[serde(flatten)]
    pub common: CommonFields,
    pub suggested: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Greetings {
    #[serde(flatten)]
    pub common: CommonFields,
}

impl Greetings {
    /// Whether the provider flagged the message as a greeting
    pub fn is_greeting(&self) -> bool {
        self.common.value.as_deref() == Some("true")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountOfMoney {
    #[serde(flatten)]
    pub common: CommonFields,
    /// Currency code or symbol
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhoneNumber {
    #[serde(flatten)]
    pub common: CommonFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Email {
    #[serde(flatten)]
    pub common: CommonFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distance {
    #[serde(flatten)]
    pub common: CommonFields,
    pub unit: String,
}

/// A duration, with its per-unit components and the total in seconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Duration {
    #[serde(flatten)]
    pub common: CommonFields,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub normalized: DurationQuantity,
}

impl Duration {
    /// The sub-field for `unit`, if the provider sent one
    pub fn component(&self, unit: DurationUnit) -> Option<&str> {
        let field = match unit {
            DurationUnit::Second => &self.second,
            DurationUnit::Minute => &self.minute,
            DurationUnit::Hour => &self.hour,
            DurationUnit::Day => &self.day,
            DurationUnit::Month => &self.month,
            DurationUnit::Year => &self.year,
        };
        field.as_deref()
    }

    pub(crate) fn set_component(&mut self, unit: DurationUnit, value: String) {
        let field = match unit {
            DurationUnit::Second => &mut self.second,
            DurationUnit::Minute => &mut self.minute,
            DurationUnit::Hour => &mut self.hour,
            DurationUnit::Day => &mut self.day,
            DurationUnit::Month => &mut self.month,
            DurationUnit::Year => &mut self.year,
        };
        *field = Some(value);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quantity {
    #[serde(flatten)]
    pub common: CommonFields,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Temperature {
    #[serde(flatten)]
    pub common: CommonFields,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Volume {
    #[serde(flatten)]
    pub common: CommonFields,
    pub unit: String,
}

/// Entity that matched no known shape. Every field besides the common ones is
/// kept in `extra`, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Custom {
    #[serde(flatten)]
    pub common: CommonFields,
    pub source_tag: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, Value>,
}

impl Custom {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.extra.get(field)
    }
}

/// One decoded entity occurrence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NlpEntity {
    Intent(Intent),
    Datetime(Datetime),
    Reminder(Reminder),
    Greetings(Greetings),
    AmountOfMoney(AmountOfMoney),
    PhoneNumber(PhoneNumber),
    Email(Email),
    Distance(Distance),
    Duration(Duration),
    Quantity(Quantity),
    Temperature(Temperature),
    Volume(Volume),
    Custom(Custom),
}

/// A concrete entity shape that an [`NlpEntity`] can be narrowed to.
pub trait EntityVariant: Sized {
    /// Tag of the enum variant wrapping this type
    const KIND: EntityKind;

    fn common(&self) -> &CommonFields;

    /// Borrow `entity` as `Self` if it holds this variant
    fn from_entity(entity: &NlpEntity) -> Option<&Self>;

    /// Take `entity` as `Self`, handing it back untouched on mismatch
    fn from_entity_owned(entity: NlpEntity) -> Result<Self, NlpEntity>;
}

macro_rules! entity_variant {
    ($($name:ident),+ $(,)?) => {
        $(
            impl EntityVariant for $name {
                const KIND: EntityKind = EntityKind::$name;

                fn common(&self) -> &CommonFields {
                    &self.common
                }

                fn from_entity(entity: &NlpEntity) -> Option<&Self> {
                    match entity {
                        NlpEntity::$name(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn from_entity_owned(entity: NlpEntity) -> Result<Self, NlpEntity> {
                    match entity {
                        NlpEntity::$name(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }

            impl $name {
                pub fn confidence(&self) -> Option<f64> {
                    self.common.confidence
                }

                pub fn value(&self) -> Option<&str> {
                    self.common.value.as_deref()
                }

                pub fn entity_type(&self) -> Option<&str> {
                    self.common.entity_type.as_deref()
                }
            }

            impl From<$name> for NlpEntity {
                fn from(inner: $name) -> Self {
                    NlpEntity::$name(inner)
                }
            }
        )+

        impl NlpEntity {
            pub fn kind(&self) -> EntityKind {
                match self {
                    $(NlpEntity::$name(_) => EntityKind::$name,)+
                }
            }

            pub fn common(&self) -> &CommonFields {
                match self {
                    $(NlpEntity::$name(inner) => &inner.common,)+
                }
            }
        }
    };
}

entity_variant!(
    Intent,
    Datetime,
    Reminder,
    Greetings,
    AmountOfMoney,
    PhoneNumber,
    Email,
    Distance,
    Duration,
    Quantity,
    Temperature,
    Volume,
    Custom,
);

impl NlpEntity {
    pub fn confidence(&self) -> Option<f64> {
        self.common().confidence
    }

    pub fn value(&self) -> Option<&str> {
        self.common().value.as_deref()
    }

    pub fn entity_type(&self) -> Option<&str> {
        self.common().entity_type.as_deref()
    }

    /// Original key for intents and custom entities
    pub fn source_tag(&self) -> Option<&str> {
        match self {
            NlpEntity::Intent(intent) => Some(&intent.source_tag),
            NlpEntity::Custom(custom) => Some(&custom.source_tag),
            _ => None,
        }
    }

    pub fn is<V: EntityVariant>(&self) -> bool {
        self.kind() == V::KIND
    }

    /// Narrow to a concrete variant.
    ///
    /// This only inspects the tag assigned at classification time; the raw
    /// payload is not consulted again.
    pub fn as_variant<V: EntityVariant>(&self) -> Result<&V, NlpError> {
        V::from_entity(self).ok_or(NlpError::TypeMismatch {
            expected: V::KIND,
            actual: self.kind(),
        })
    }

    /// Owning counterpart of [`NlpEntity::as_variant`]
    pub fn into_variant<V: EntityVariant>(self) -> Result<V, NlpError> {
        let actual = self.kind();
        V::from_entity_owned(self).map_err(|_| NlpError::TypeMismatch {
            expected: V::KIND,
            actual,
        })
    }
}
