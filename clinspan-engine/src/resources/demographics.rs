//! Demographic rules: `cui,concept,category,label,phrases,disabled`

use super::{check_columns, csv_reader, invalid_row, open};
use crate::error::{EngineError, Result};
use clinspan_core::DemographicRule;
use std::io::Read;
use std::path::Path;

/// Expected header row
pub const DEMOGRAPHIC_COLUMNS: &[&str] = &["cui", "concept", "category", "label", "phrases", "disabled"];

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" | "n" => Some(false),
        "true" | "1" | "yes" | "y" => Some(true),
        _ => None,
    }
}

/// Load demographic rules. Rows without a concept id or marked disabled are
/// skipped; phrases are `|`-separated.
pub fn load_demographics<R: Read>(reader: R, resource: &str) -> Result<Vec<DemographicRule>> {
    let mut reader = csv_reader(reader, true);
    check_columns(&mut reader, DEMOGRAPHIC_COLUMNS, resource)?;

    let mut rules = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| EngineError::csv(resource, e))?;
        let concept = &record[1];
        if concept.is_empty() {
            log::trace!("{resource}: row without concept id skipped");
            continue;
        }

        let disabled = parse_flag(&record[5])
            .ok_or_else(|| invalid_row(resource, &record, format!("disabled '{}' is not a boolean", &record[5])))?;
        if disabled {
            continue;
        }

        let concept_id = concept
            .parse()
            .map_err(|_| invalid_row(resource, &record, format!("concept '{concept}' is not an integer")))?;

        rules.push(DemographicRule {
            concept_id,
            category: record[2].to_string(),
            label: record[3].to_string(),
            phrases: record[4]
                .split('|')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        });
    }

    log::debug!("{resource}: {} demographic rule(s)", rules.len());
    Ok(rules)
}

/// Load demographic rules from a file
pub fn load_demographics_file(path: &Path) -> Result<Vec<DemographicRule>> {
    load_demographics(open(path)?, &path.display().to_string())
}
