//! CSV resource loading
//!
//! Every loader reads from any `Read` plus a resource name used in error
//! messages, with a `*_file` convenience wrapper taking a path.

mod concepts;
mod demographics;
mod knowledge_base;
mod sections;

pub use concepts::{load_concepts, load_concepts_file, CONCEPT_COLUMNS};
pub use demographics::{load_demographics, load_demographics_file, DEMOGRAPHIC_COLUMNS};
pub use knowledge_base::{
    load_knowledge_base, load_knowledge_base_file, CONDITION_TYPE, KNOWLEDGE_BASE_COLUMNS,
};
pub use sections::{load_sections, load_sections_file};

use crate::config::ResourcePaths;
use crate::error::{EngineError, Result};
use crate::spotting::NegationPatternSet;
use clinspan_core::{ConceptMap, ConditionHierarchy, DemographicRule, SectionHeaderMap};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Every resource named by a configuration, loaded
#[derive(Debug, Clone)]
pub struct Resources {
    /// Condition knowledge base
    pub hierarchy: ConditionHierarchy,
    /// Concept display names
    pub concepts: ConceptMap,
    /// Section header map
    pub sections: SectionHeaderMap,
    /// Demographic rules
    pub demographic_rules: Vec<DemographicRule>,
    /// Negation patterns
    pub negation_patterns: NegationPatternSet,
}

/// Resource counts reported by `validate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceStats {
    /// Condition sequences
    pub sequences: usize,
    /// Hierarchy depth including the concept level
    pub levels: usize,
    /// Distinct entry phrases
    pub entry_phrases: usize,
    /// Named concepts
    pub concept_names: usize,
    /// Section header patterns
    pub section_headers: usize,
    /// Demographic rules
    pub demographic_rules: usize,
    /// Negation patterns across all categories
    pub negation_patterns: usize,
}

impl Resources {
    /// Load everything `paths` points at. Optional resources that are not
    /// configured come back empty; negation patterns fall back to the
    /// built-in set.
    pub fn load(paths: &ResourcePaths) -> Result<Self> {
        let hierarchy = load_knowledge_base_file(&paths.knowledge_base)?;
        let concepts = match &paths.concepts {
            Some(path) => load_concepts_file(path)?,
            None => ConceptMap::new(),
        };
        let sections = match &paths.sections {
            Some(path) => load_sections_file(path)?,
            None => SectionHeaderMap::empty(),
        };
        let demographic_rules = match &paths.demographics {
            Some(path) => load_demographics_file(path)?,
            None => Vec::new(),
        };
        let negation_patterns = match &paths.negation_patterns {
            Some(path) => NegationPatternSet::from_file(path)?,
            None => NegationPatternSet::builtin()?,
        };

        let resources = Self {
            hierarchy,
            concepts,
            sections,
            demographic_rules,
            negation_patterns,
        };
        log::debug!("loaded resources: {:?}", resources.stats());
        Ok(resources)
    }

    /// Counts for reporting
    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            sequences: self.hierarchy.sequence_count(),
            levels: self.hierarchy.levels(),
            entry_phrases: self.hierarchy.entry_phrase_count(),
            concept_names: self.concepts.len(),
            section_headers: self.sections.len(),
            demographic_rules: self.demographic_rules.len(),
            negation_patterns: self.negation_patterns.len(),
        }
    }
}

pub(crate) fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| EngineError::io(path, e))
}

pub(crate) fn csv_reader<R: Read>(reader: R, has_headers: bool) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .trim(csv::Trim::All)
        .flexible(!has_headers)
        .from_reader(reader)
}

/// Require the header row to equal `expected`, compared case-insensitively
pub(crate) fn check_columns<R: Read>(
    reader: &mut csv::Reader<R>,
    expected: &[&str],
    resource: &str,
) -> Result<()> {
    let found: Vec<String> = reader
        .headers()
        .map_err(|e| EngineError::csv(resource, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let matches = found.len() == expected.len()
        && found
            .iter()
            .zip(expected)
            .all(|(found, expected)| found.eq_ignore_ascii_case(expected));

    if matches {
        Ok(())
    } else {
        Err(EngineError::UnexpectedColumns {
            resource: resource.to_string(),
            expected: expected.iter().map(|s| s.to_string()).collect(),
            found,
        })
    }
}

pub(crate) fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

pub(crate) fn invalid_row(resource: &str, record: &csv::StringRecord, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidRow {
        resource: resource.to_string(),
        line: line_of(record),
        reason: reason.into(),
    }
}
