//! Output formatting module

use anyhow::Result;
use clinspan_engine::Annotation;
use serde::Serialize;

/// Annotation of one input file
#[derive(Debug, Serialize)]
pub struct DocumentRecord {
    /// Input path as given
    pub file: String,
    /// Everything found in the file
    pub annotation: Annotation,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Format and output one annotated file
    fn format_document(&mut self, record: &DocumentRecord) -> Result<()>;

    /// Finalize output (e.g., close JSON array)
    fn finish(&mut self) -> Result<()>;
}

pub mod json;
pub mod jsonl;
pub mod text;

pub use json::JsonFormatter;
pub use jsonl::JsonlFormatter;
pub use text::TextFormatter;

#[cfg(test)]
pub(crate) mod fixtures {
    use super::DocumentRecord;
    use clinspan_engine::{Annotator, ConditionHierarchy, HierarchyEntry};

    pub fn record(text: &str) -> DocumentRecord {
        let hierarchy = ConditionHierarchy::from_entries(vec![
            HierarchyEntry::new("S1", 312437, 1, "dyspnea"),
            HierarchyEntry::new("S2", 437663, 1, "fever"),
        ])
        .unwrap();
        let annotator = Annotator::builder()
            .hierarchy(hierarchy)
            .detect_vitals(true)
            .build()
            .unwrap();
        DocumentRecord {
            file: "note.txt".to_string(),
            annotation: annotator.annotate(text).unwrap(),
        }
    }
}
