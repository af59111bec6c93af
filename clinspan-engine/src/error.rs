//! Engine error types

use clinspan_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading resources or building the annotator
#[derive(Error, Debug)]
pub enum EngineError {
    /// Core resolution error
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// A resource file could not be read
    #[error("failed to read '{path}': {source}")]
    Io {
        /// The file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Malformed CSV
    #[error("CSV error in {resource}: {source}")]
    Csv {
        /// Resource name or path
        resource: String,
        /// Underlying CSV error
        source: csv::Error,
    },

    /// Header row does not match the expected columns
    #[error("unexpected columns in {resource}: expected {expected:?}, found {found:?}")]
    UnexpectedColumns {
        /// Resource name or path
        resource: String,
        /// Expected column names
        expected: Vec<String>,
        /// Columns actually present
        found: Vec<String>,
    },

    /// A row whose values cannot be used
    #[error("invalid row in {resource} at line {line}: {reason}")]
    InvalidRow {
        /// Resource name or path
        resource: String,
        /// 1-based line number
        line: u64,
        /// What is wrong with the row
        reason: String,
    },

    /// Knowledge-base row with an unrecognized `type`
    #[error("unknown condition type '{found}' in {resource} at line {line}")]
    UnknownConditionType {
        /// Resource name or path
        resource: String,
        /// 1-based line number
        line: u64,
        /// The rejected type value
        found: String,
    },

    /// TOML that does not parse into the expected shape
    #[error("configuration error in {path}: {message}")]
    Toml {
        /// The file path, or `<embedded>`
        path: String,
        /// Parser message
        message: String,
    },

    /// Negation pattern that cannot be compiled
    #[error("invalid negation pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern text
        pattern: String,
        /// Why it was rejected
        reason: String,
    },

    /// A required resource was never provided
    #[error("missing required resource: {0}")]
    MissingResource(&'static str),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(resource: &str, source: csv::Error) -> Self {
        EngineError::Csv {
            resource: resource.to_string(),
            source,
        }
    }
}
