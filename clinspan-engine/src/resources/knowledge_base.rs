//! Condition knowledge base: `type,seq_id,concept_id,level,phrases`

use super::{check_columns, csv_reader, invalid_row, line_of, open};
use crate::error::{EngineError, Result};
use clinspan_core::{ConditionHierarchy, HierarchyEntry};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Expected header row
pub const KNOWLEDGE_BASE_COLUMNS: &[&str] = &["type", "seq_id", "concept_id", "level", "phrases"];

/// The only accepted `type` value
pub const CONDITION_TYPE: &str = "EmrCondition";

#[derive(Debug, Deserialize)]
struct KnowledgeBaseRow {
    kind: String,
    seq_id: String,
    concept_id: String,
    level: String,
    phrase: String,
}

/// Load a knowledge base; any unrecognized `type` rejects the whole file
pub fn load_knowledge_base<R: Read>(reader: R, resource: &str) -> Result<ConditionHierarchy> {
    let mut reader = csv_reader(reader, true);
    check_columns(&mut reader, KNOWLEDGE_BASE_COLUMNS, resource)?;

    let mut hierarchy = ConditionHierarchy::new();
    let mut rows = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| EngineError::csv(resource, e))?;
        let row: KnowledgeBaseRow = record
            .deserialize(None)
            .map_err(|e| EngineError::csv(resource, e))?;

        if row.kind != CONDITION_TYPE {
            return Err(EngineError::UnknownConditionType {
                resource: resource.to_string(),
                line: line_of(&record),
                found: row.kind,
            });
        }

        let concept_id = row
            .concept_id
            .parse()
            .map_err(|_| invalid_row(resource, &record, format!("concept_id '{}' is not an integer", row.concept_id)))?;
        let level = row
            .level
            .parse()
            .map_err(|_| invalid_row(resource, &record, format!("level '{}' is not a positive integer", row.level)))?;

        hierarchy.insert(HierarchyEntry::new(row.seq_id, concept_id, level, row.phrase))?;
        rows += 1;
    }

    log::debug!(
        "{resource}: {rows} row(s), {} sequence(s), {} level(s)",
        hierarchy.sequence_count(),
        hierarchy.levels()
    );
    Ok(hierarchy)
}

/// Load a knowledge base from a file
pub fn load_knowledge_base_file(path: &Path) -> Result<ConditionHierarchy> {
    load_knowledge_base(open(path)?, &path.display().to_string())
}
