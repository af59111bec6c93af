//! Concept id to display-name lookup

use crate::types::ConceptId;
use std::collections::HashMap;

/// Read-only concept name table
#[derive(Debug, Clone, Default)]
pub struct ConceptMap {
    names: HashMap<ConceptId, String>,
}

impl ConceptMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of named concepts
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when no names are known
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Register a display name
    pub fn insert(&mut self, id: ConceptId, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    /// Known name, if any
    pub fn get(&self, id: ConceptId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Name lookup with graceful fallback: table name, then `fallback` when
    /// non-empty, then the id itself
    pub fn label(&self, id: ConceptId, fallback: Option<&str>) -> String {
        match self.get(id).filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => match fallback.filter(|label| !label.is_empty()) {
                Some(label) => label.to_string(),
                None => id.to_string(),
            },
        }
    }
}

impl FromIterator<(ConceptId, String)> for ConceptMap {
    fn from_iter<I: IntoIterator<Item = (ConceptId, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
