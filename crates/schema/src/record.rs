//! The live answer record: section id -> field label -> value.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All answers entered so far, keyed by section and field label.
///
/// Ordered maps keep serialization and export deterministic. The record
/// itself performs no shape checking; the form engine validates every
/// write against the schema before it lands here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    sections: BTreeMap<String, BTreeMap<String, Value>>,
}

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, section_id: &str, label: &str) -> Option<&Value> {
        self.sections.get(section_id)?.get(label)
    }

    /// Replaces the value at the path wholesale. Storing `Value::Empty`
    /// removes the entry instead, so blank answers never accumulate.
    pub fn set(&mut self, section_id: impl Into<String>, label: impl Into<String>, value: Value) {
        let section_id = section_id.into();
        let label = label.into();
        if matches!(value, Value::Empty) {
            self.remove(&section_id, &label);
            return;
        }
        self.sections.entry(section_id).or_default().insert(label, value);
    }

    pub fn remove(&mut self, section_id: &str, label: &str) -> Option<Value> {
        let section = self.sections.get_mut(section_id)?;
        let removed = section.remove(label);
        if section.is_empty() {
            self.sections.remove(section_id);
        }
        removed
    }

    /// Field label/value pairs of one section, in label order.
    pub fn section(&self, section_id: &str) -> impl Iterator<Item = (&str, &Value)> {
        self.sections
            .get(section_id)
            .into_iter()
            .flat_map(|fields| fields.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
