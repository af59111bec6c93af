//! Validate command implementation

use crate::error::CliError;
use anyhow::Result;
use clap::Args;
use clinspan_engine::{AnnotatorConfig, Resources};
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Annotator configuration file to validate
    #[arg(short, long, value_name = "FILE", env = "CLINSPAN_CONFIG")]
    pub config: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        println!("Validating configuration: {}", self.config.display());

        match AnnotatorConfig::from_file(&self.config).and_then(|config| Resources::load(&config.resources)) {
            Ok(resources) => {
                let stats = resources.stats();
                println!("✓ Configuration is valid!");
                println!("  Condition sequences: {}", stats.sequences);
                println!("  Hierarchy levels:    {}", stats.levels);
                println!("  Entry phrases:       {}", stats.entry_phrases);
                println!("  Concept names:       {}", stats.concept_names);
                println!("  Section headers:     {}", stats.section_headers);
                println!("  Demographic rules:   {}", stats.demographic_rules);
                println!("  Negation patterns:   {}", stats.negation_patterns);
                Ok(())
            }
            Err(e) => {
                println!("✗ Configuration is invalid!");
                println!("  Error: {e}");
                Err(CliError::ConfigError(e.to_string()).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_args_debug() {
        let args = ValidateArgs {
            config: PathBuf::from("clinspan.toml"),
        };

        let debug_str = format!("{:?}", args);
        assert!(debug_str.contains("ValidateArgs"));
        assert!(debug_str.contains("clinspan.toml"));
    }

    #[test]
    fn test_validate_valid_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("kb.csv"),
            "type,seq_id,concept_id,level,phrases\nEmrCondition,S1,1,1,asthma\n",
        )
        .unwrap();
        let config = dir.path().join("clinspan.toml");
        fs::write(&config, "[resources]\nknowledge_base = \"kb.csv\"\n").unwrap();

        assert!(ValidateArgs { config }.execute().is_ok());
    }

    #[test]
    fn test_validate_bad_header() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("kb.csv"), "seq_id,concept_id\nS1,1\n").unwrap();
        let config = dir.path().join("clinspan.toml");
        fs::write(&config, "[resources]\nknowledge_base = \"kb.csv\"\n").unwrap();

        let err = ValidateArgs { config }.execute().unwrap_err();
        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::ConfigError(_))));
    }
}
