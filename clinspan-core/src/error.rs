//! Core error types (deterministic only)

use thiserror::Error;

/// Core resolution errors (no I/O, no external failures)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A span whose end precedes its start, or which runs past the text
    #[error("invalid span {start}..{end} for text of length {len}")]
    InvalidSpan {
        /// Span start offset
        start: usize,
        /// Span end offset
        end: usize,
        /// Length of the text the span points into
        len: usize,
    },

    /// Sentence spans that overlap or are out of order
    #[error("sentence {index} ({start}..{end}) overlaps or precedes the previous sentence")]
    UnorderedSentences {
        /// Index of the offending sentence
        index: usize,
        /// Sentence start offset
        start: usize,
        /// Sentence end offset
        end: usize,
    },

    /// Knowledge-base entry registered at a level the hierarchy cannot hold
    #[error("invalid hierarchy level {level} for sequence '{sequence_id}'")]
    InvalidLevel {
        /// Sequence the entry belongs to
        sequence_id: String,
        /// The rejected level
        level: usize,
    },

    /// Section header pattern that does not compile
    #[error("invalid section header pattern '{pattern}': {reason}")]
    InvalidHeaderPattern {
        /// The raw header pattern
        pattern: String,
        /// Regex compiler message
        reason: String,
    },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
