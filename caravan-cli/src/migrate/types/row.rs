//! Row being migrated: source fields plus in-progress destination fields

use std::collections::HashMap;

use serde_json::Value;

/// One in-progress record: the original source properties plus whatever
/// destination properties earlier steps of the same run have computed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    source: HashMap<String, Value>,
    destination: HashMap<String, Value>,
}

impl Row {
    pub fn new(source: HashMap<String, Value>) -> Self {
        Self {
            source,
            destination: HashMap::new(),
        }
    }

    /// Build a row from a flat JSON object, as loaded from a manifest.
    pub fn from_object(object: &serde_json::Map<String, Value>) -> Self {
        Self {
            source: object.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            destination: HashMap::new(),
        }
    }

    pub fn source_property(&self, name: &str) -> Option<&Value> {
        self.source.get(name)
    }

    pub fn destination_property(&self, name: &str) -> Option<&Value> {
        self.destination.get(name)
    }

    /// Add a source property, overwriting any previous value.
    pub fn set_source_property(&mut self, name: impl Into<String>, value: Value) {
        self.source.insert(name.into(), value);
    }

    /// Record a computed destination value for later steps on this row.
    pub fn set_destination_property(&mut self, name: impl Into<String>, value: Value) {
        self.destination.insert(name.into(), value);
    }
}
