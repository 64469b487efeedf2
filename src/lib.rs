//! # nlpkit: typed Messenger NLP entities
//!
//! Messenger attaches the result of its built-in NLP (wit.ai) to inbound
//! messages as an `nlp` object. Its keys are entity names chosen by the
//! engine and each maps to an array of loosely shaped entity objects:
//!
//! ```json
//! {
//!   "datetime": [{"confidence": 0.99, "value": "2017-08-02T00:00:00.000+02:00", "grain": "day", "type": "value"}],
//!   "reminder": [{"confidence": 0.95, "value": "hallo!", "suggested": true, "type": "value"}]
//! }
//! ```
//!
//! nlpkit decodes that object into an [`NlpResult`]: an ordered list of
//! [`NlpEntity`] values, each classified by its fields into one of a closed
//! set of shapes (datetime, duration, amount of money, ...) or kept as a
//! [`entity::Custom`] entity with its original key and fields.
//!
//! ## Example
//!
//! ```
//! use nlpkit::entity::{Datetime, Reminder};
//! use nlpkit::NlpResult;
//!
//! let nlp: NlpResult = serde_json::from_str(r#"{
//!     "datetime": [{"confidence": 0.99, "value": "2017-08-02T00:00:00.000+02:00", "grain": "day", "type": "value"}],
//!     "reminder": [{"confidence": 0.95, "value": "hallo!", "suggested": true, "type": "value"}]
//! }"#).unwrap();
//!
//! assert_eq!(nlp.entities().len(), 2);
//! assert_eq!(nlp.entities_of::<Datetime>()[0].grain.as_deref(), Some("day"));
//!
//! let reminder = nlp.entities()[1].as_variant::<Reminder>().unwrap();
//! assert!(reminder.suggested);
//! ```

pub mod adapter;
pub mod entity;
pub mod error;
pub mod normalizer;
pub mod registry;
pub mod result;

pub use adapter::{decode, decode_with};
pub use entity::{CommonFields, EntityKind, EntityVariant, NlpEntity};
pub use error::{ConfigError, NlpError, NormalizeError};
pub use normalizer::{normalize, DurationQuantity, DurationUnit};
pub use registry::{default_registry, ClassifierConfig, EntityRegistry, RawEntityObject};
pub use result::NlpResult;
