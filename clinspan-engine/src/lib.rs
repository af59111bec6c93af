//! Resource loading and the end-to-end annotation pipeline
//!
//! This crate loads the CSV dictionaries and TOML configuration, provides a
//! reference tokenizer, sentencizer, phrase spotter and negation tagger, and
//! combines them with the resolution stage of `clinspan-core`.
//!
//! ```rust
//! use clinspan_engine::{Annotator, ConditionHierarchy, HierarchyEntry};
//!
//! let hierarchy = ConditionHierarchy::from_entries(vec![
//!     HierarchyEntry::new("S1", 312437, 1, "dyspnea"),
//! ])
//! .unwrap();
//! let annotator = Annotator::builder().hierarchy(hierarchy).build().unwrap();
//!
//! let annotation = annotator.annotate("Worsening dyspnea. No fever.").unwrap();
//! assert_eq!(annotation.condition_count(), 1);
//! ```

#![warn(missing_docs)]

pub mod annotator;
pub mod config;
pub mod error;
pub mod resources;
pub mod spotting;
pub mod text;
pub mod vitals;

pub use annotator::{Annotation, Annotator, AnnotatorBuilder};
pub use config::{AnnotatorConfig, PipelineOptions, ResourcePaths};
pub use error::{EngineError, Result};
pub use resources::{ResourceStats, Resources};
pub use spotting::{NegationPatternSet, NegationTagger, PhraseSpotter, TokenPattern};
pub use text::{DelimiterSentencizer, Sentencizer, SimpleTokenizer, Tokenizer};
pub use vitals::{detect_vitals, VitalKind, VitalSign, Vitals};

// Re-export from core for convenience
pub use clinspan_core::{
    ConceptMap, ConditionHierarchy, DemographicRule, HierarchyEntry, SectionHeaderMap, Span,
    Summary,
};
