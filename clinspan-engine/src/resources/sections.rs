//! Section header map: headerless `normalized_type,raw_header_pattern` rows

use super::{csv_reader, invalid_row, open};
use crate::error::{EngineError, Result};
use clinspan_core::SectionHeaderMap;
use std::io::Read;
use std::path::Path;

/// Load a section header map. A pattern listed twice keeps its last type.
pub fn load_sections<R: Read>(reader: R, resource: &str) -> Result<SectionHeaderMap> {
    let mut reader = csv_reader(reader, false);
    let mut entries: Vec<(String, String)> = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| EngineError::csv(resource, e))?;
        let (Some(kind), Some(pattern)) = (record.get(0), record.get(1)) else {
            return Err(invalid_row(resource, &record, "expected two columns"));
        };
        if pattern.is_empty() {
            return Err(invalid_row(resource, &record, "empty header pattern"));
        }

        match entries.iter_mut().find(|(_, p)| p.eq_ignore_ascii_case(pattern)) {
            Some(existing) => existing.0 = kind.to_string(),
            None => entries.push((kind.to_string(), pattern.to_string())),
        }
    }

    log::debug!("{resource}: {} section header(s)", entries.len());
    Ok(SectionHeaderMap::new(entries)?)
}

/// Load a section header map from a file
pub fn load_sections_file(path: &Path) -> Result<SectionHeaderMap> {
    load_sections(open(path)?, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_load_sections() {
        let map = load_sections(
            Cursor::new("fam_history,family history\nassessment,assessment\nplan,Assessment\n"),
            "sections",
        )
        .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.section_type("FAMILY HISTORY"), Some("fam_history"));
        assert_eq!(map.section_type("assessment"), Some("plan"));
    }

    #[test]
    fn test_short_row_rejected() {
        let err = load_sections(Cursor::new("fam_history\n"), "sections").unwrap_err();
        assert!(matches!(err, EngineError::InvalidRow { line: 1, .. }));
    }
}
