//! Span resolution for clinical narrative annotation
//!
//! This crate turns raw phrase hits and negation-pattern hits over a
//! tokenized, sentence-split document into de-duplicated, negation-aware,
//! section-aware condition facts. It is pure: no I/O, no shared mutable
//! state. Loading dictionaries and spotting phrases live in
//! `clinspan-engine`.
//!
//! # Stages
//!
//! - [`section`]: header hits merged into a partition of the document
//! - [`hierarchy`]: multi-level trigger chains resolved into conditions
//! - [`negation`]: directional scopes clipped by closure markers
//! - [`postprocess`]: ignored sections, nested entities, flattening
//! - [`summary`]: concept-grouped, sentence-grouped summaries
//!
//! # Example
//!
//! ```rust
//! use clinspan_core::{
//!     negation_index, AnnotationResolver, ConceptMap, ConditionHierarchy, HierarchyEntry,
//!     PhraseHit, Span,
//! };
//!
//! let hierarchy = ConditionHierarchy::from_entries(vec![
//!     HierarchyEntry::new("S1", 320128, 1, "hypertension"),
//!     HierarchyEntry::new("S1", 320128, 2, "essential"),
//! ])
//! .unwrap();
//! let concepts: ConceptMap = vec![(320128, "Essential hypertension".to_string())]
//!     .into_iter()
//!     .collect();
//! let resolver = AnnotationResolver::new(hierarchy, concepts);
//!
//! let text = "Essential hypertension, controlled.";
//! let sentences = vec![Span::new(0, text.len())];
//! let hits = vec![
//!     PhraseHit::new(Span::new(0, 9), "Essential"),
//!     PhraseHit::new(Span::new(10, 22), "hypertension"),
//! ];
//! let negation = negation_index(&sentences, &[]);
//!
//! let result = resolver.resolve_conditions(&sentences, &[], &hits, &negation);
//! assert_eq!(result.facts[0].codes[0].triggers, "Essential, hypertension");
//! ```

#![warn(missing_docs)]

pub mod concept;
pub mod demographic;
pub mod error;
pub mod hierarchy;
pub mod interval;
pub mod negation;
pub mod pipeline;
pub mod postprocess;
pub mod section;
pub mod summary;
pub mod types;

pub use concept::ConceptMap;
pub use demographic::{DemographicConcept, DemographicHit, DemographicLexicon, DemographicRule};
pub use error::{CoreError, Result};
pub use hierarchy::{
    ConditionEntity, ConditionHierarchy, HierarchyEntry, Resolution, TriggerNode, MAX_LEVEL,
};
pub use interval::IntervalIndex;
pub use negation::{NegationIndex, NegationScope};
pub use pipeline::{
    negation_index, resolve_demographics, AnnotationResolver, ConditionResolution,
    DemographicResolution, NegatedEntity,
};
pub use postprocess::{FactRecord, SentenceFacts, DEFAULT_IGNORED_SECTIONS};
pub use section::{HeaderSpan, SectionHeaderMap};
pub use summary::{ConceptSummary, SentenceSummary, Summarize, Summary, CONDITION_CATEGORY};
pub use types::{
    group_by_sentence, ConceptId, Document, NegationKind, NegationMatch, PhraseHit, SectionSpan,
    SentenceGroup, Span, Token,
};
