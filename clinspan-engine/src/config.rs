//! TOML configuration for the annotator
//!
//! ```toml
//! [resources]
//! knowledge_base = "phrase_to_condition.csv"
//! sections = "sections.csv"
//!
//! [pipeline]
//! ignored_sections = ["fam_history"]
//! detect_vitals = true
//! ```

use crate::error::{EngineError, Result};
use clinspan_core::DEFAULT_IGNORED_SECTIONS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotatorConfig {
    /// Resource file locations
    pub resources: ResourcePaths,
    /// Pipeline switches
    #[serde(default)]
    pub pipeline: PipelineOptions,
}

/// Resource file locations; relative paths are resolved against the
/// directory of the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourcePaths {
    /// Condition knowledge base CSV (required)
    pub knowledge_base: PathBuf,
    /// Section header map CSV
    #[serde(default)]
    pub sections: Option<PathBuf>,
    /// Demographic rules CSV
    #[serde(default)]
    pub demographics: Option<PathBuf>,
    /// Concept names CSV
    #[serde(default)]
    pub concepts: Option<PathBuf>,
    /// Negation pattern TOML replacing the built-in set
    #[serde(default)]
    pub negation_patterns: Option<PathBuf>,
}

/// Pipeline switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineOptions {
    /// Section types whose sentences are suppressed
    #[serde(default = "default_ignored_sections")]
    pub ignored_sections: Vec<String>,
    /// Drop demographic hits inside negation scopes
    #[serde(default)]
    pub negate_demographics: bool,
    /// Run the age, blood pressure and oxygen saturation detectors
    #[serde(default)]
    pub detect_vitals: bool,
    /// Report negated conditions in the output
    #[serde(default)]
    pub keep_negated: bool,
}

fn default_ignored_sections() -> Vec<String> {
    DEFAULT_IGNORED_SECTIONS.iter().map(|s| s.to_string()).collect()
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            ignored_sections: default_ignored_sections(),
            negate_demographics: false,
            detect_vitals: false,
            keep_negated: false,
        }
    }
}

impl AnnotatorConfig {
    /// Configuration with only the knowledge base set
    pub fn new(knowledge_base: impl Into<PathBuf>) -> Self {
        Self {
            resources: ResourcePaths {
                knowledge_base: knowledge_base.into(),
                sections: None,
                demographics: None,
                concepts: None,
                negation_patterns: None,
            },
            pipeline: PipelineOptions::default(),
        }
    }

    /// Parse TOML text; paths are left as written
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| EngineError::Toml {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load a configuration file and resolve its resource paths
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        let mut config: Self = toml::from_str(&content).map_err(|e| EngineError::Toml {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        if let Some(base) = path.parent() {
            config.resources.resolve_against(base);
        }
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }
}

impl ResourcePaths {
    /// Prefix every relative path with `base`
    pub fn resolve_against(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        resolve(&mut self.knowledge_base);
        for path in [
            &mut self.sections,
            &mut self.demographics,
            &mut self.concepts,
            &mut self.negation_patterns,
        ]
        .into_iter()
        .flatten()
        {
            resolve(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AnnotatorConfig::from_toml_str("[resources]\nknowledge_base = \"kb.csv\"\n").unwrap();
        assert_eq!(config.resources.knowledge_base, PathBuf::from("kb.csv"));
        assert_eq!(config.pipeline, PipelineOptions::default());
        assert_eq!(config.pipeline.ignored_sections, vec!["fam_history".to_string()]);
    }

    #[test]
    fn test_pipeline_overrides() {
        let config = AnnotatorConfig::from_toml_str(
            r#"
[resources]
knowledge_base = "kb.csv"

[pipeline]
ignored_sections = []
detect_vitals = true
"#,
        )
        .unwrap();
        assert!(config.pipeline.ignored_sections.is_empty());
        assert!(config.pipeline.detect_vitals);
        assert!(!config.pipeline.keep_negated);
    }

    #[test]
    fn test_missing_knowledge_base_rejected() {
        let err = AnnotatorConfig::from_toml_str("[resources]\nsections = \"s.csv\"\n").unwrap_err();
        assert!(matches!(err, EngineError::Toml { .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = AnnotatorConfig::from_toml_str("[resources]\nknowledge_base = \"kb.csv\"\nextra = 1\n").unwrap_err();
        assert!(matches!(err, EngineError::Toml { .. }));
    }

    #[test]
    fn test_paths_resolved_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinspan.toml");
        std::fs::write(
            &path,
            "[resources]\nknowledge_base = \"kb.csv\"\nsections = \"/abs/sections.csv\"\n",
        )
        .unwrap();

        let config = AnnotatorConfig::from_file(&path).unwrap();
        assert_eq!(config.resources.knowledge_base, dir.path().join("kb.csv"));
        assert_eq!(config.resources.sections, Some(PathBuf::from("/abs/sections.csv")));
    }
}
