//! Concept names: `concept_id,concept_name`

use super::{check_columns, csv_reader, invalid_row, open};
use crate::error::{EngineError, Result};
use clinspan_core::ConceptMap;
use std::io::Read;
use std::path::Path;

/// Expected header row
pub const CONCEPT_COLUMNS: &[&str] = &["concept_id", "concept_name"];

/// Load concept names
pub fn load_concepts<R: Read>(reader: R, resource: &str) -> Result<ConceptMap> {
    let mut reader = csv_reader(reader, true);
    check_columns(&mut reader, CONCEPT_COLUMNS, resource)?;

    let mut concepts = ConceptMap::new();
    for record in reader.records() {
        let record = record.map_err(|e| EngineError::csv(resource, e))?;
        let id = &record[0];
        let id = id
            .parse()
            .map_err(|_| invalid_row(resource, &record, format!("concept_id '{id}' is not an integer")))?;
        concepts.insert(id, &record[1]);
    }

    log::debug!("{resource}: {} concept name(s)", concepts.len());
    Ok(concepts)
}

/// Load concept names from a file
pub fn load_concepts_file(path: &Path) -> Result<ConceptMap> {
    load_concepts(open(path)?, &path.display().to_string())
}
