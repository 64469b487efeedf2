//! The decoded NLP annotation of one message.

use serde::Serialize;

use crate::entity::{EntityKind, EntityVariant, NlpEntity};

/// Entities decoded from one `nlp` object, in source order.
///
/// Keys are visited in the order they appear in the document and the
/// elements of each key's array in array order. The list may be empty, it is
/// never absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NlpResult {
    entities: Vec<NlpEntity>,
}

impl NlpResult {
    pub fn new(entities: Vec<NlpEntity>) -> Self {
        Self { entities }
    }

    /// All entities in source order
    pub fn entities(&self) -> &[NlpEntity] {
        &self.entities
    }

    /// Entities holding variant `V`, in source order.
    ///
    /// Entities of other variants are skipped, so an absent variant yields an
    /// empty vec.
    ///
    /// # Example
    /// ```
    /// use nlpkit::entity::Reminder;
    /// use nlpkit::NlpResult;
    ///
    /// let nlp: NlpResult = serde_json::from_str(
    ///     r#"{"reminder":[{"confidence":0.95,"value":"hallo!","suggested":true,"type":"value"}]}"#,
    /// ).unwrap();
    ///
    /// let reminders = nlp.entities_of::<Reminder>();
    /// assert_eq!(reminders.len(), 1);
    /// assert!(reminders[0].suggested);
    /// ```
    pub fn entities_of<V: EntityVariant>(&self) -> Vec<&V> {
        self.entities.iter().filter_map(V::from_entity).collect()
    }

    /// Untyped counterpart of [`NlpResult::entities_of`]
    pub fn entities_of_kind(&self, kind: EntityKind) -> Vec<&NlpEntity> {
        self.entities.iter().filter(|e| e.kind() == kind).collect()
    }

    /// First entity holding variant `V`
    pub fn first_of<V: EntityVariant>(&self) -> Option<&V> {
        self.entities.iter().find_map(V::from_entity)
    }

    pub fn has(&self, kind: EntityKind) -> bool {
        self.entities.iter().any(|e| e.kind() == kind)
    }

    pub fn has_entities(&self) -> bool {
        !self.entities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NlpEntity> {
        self.entities.iter()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl FromIterator<NlpEntity> for NlpResult {
    fn from_iter<I: IntoIterator<Item = NlpEntity>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for NlpResult {
    type Item = NlpEntity;
    type IntoIter = std::vec::IntoIter<NlpEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl<'a> IntoIterator for &'a NlpResult {
    type Item = &'a NlpEntity;
    type IntoIter = std::slice::Iter<'a, NlpEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
