//! Multi-level trigger-chain resolution
//!
//! A condition is described by one or more *sequences*. Each sequence has an
//! entry phrase (level 1) and optionally further phrases required at deeper
//! levels. Within one sentence, a phrase hit on an entry phrase starts a chain;
//! every deeper level registered for the sequence must then be satisfied by
//! some hit in the same sentence, otherwise the sequence is discarded.

use crate::concept::ConceptMap;
use crate::error::{CoreError, Result};
use crate::types::{ConceptId, PhraseHit, Span};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Separator used when joining trigger texts
pub const TRIGGER_SEPARATOR: &str = ", ";

/// Deepest level a knowledge-base row may use
pub const MAX_LEVEL: usize = 32;

/// One knowledge-base row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyEntry {
    /// Sequence the phrase belongs to
    pub sequence_id: String,
    /// Concept resolved by the sequence (read from level-1 rows)
    pub concept_id: ConceptId,
    /// Depth of the phrase, starting at 1
    pub level: usize,
    /// Phrase text
    pub phrase: String,
}

impl HierarchyEntry {
    /// Create an entry
    pub fn new(
        sequence_id: impl Into<String>,
        concept_id: ConceptId,
        level: usize,
        phrase: impl Into<String>,
    ) -> Self {
        Self {
            sequence_id: sequence_id.into(),
            concept_id,
            level,
            phrase: phrase.into(),
        }
    }
}

/// Per-level condition dictionaries
#[derive(Debug, Clone, Default)]
pub struct ConditionHierarchy {
    /// Level 0: sequence id -> concept id
    concepts: HashMap<String, ConceptId>,
    /// Level 1: phrase -> sequence ids
    entry_points: HashMap<String, Vec<String>>,
    /// Levels 2..: `continuations[level - 2]` maps sequence id -> phrases
    continuations: Vec<HashMap<String, Vec<String>>>,
}

impl ConditionHierarchy {
    /// Create an empty hierarchy
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a hierarchy from knowledge-base rows
    pub fn from_entries(entries: impl IntoIterator<Item = HierarchyEntry>) -> Result<Self> {
        let mut hierarchy = Self::new();
        for entry in entries {
            hierarchy.insert(entry)?;
        }
        Ok(hierarchy)
    }

    /// Register one row. Phrases are trimmed and lowercased.
    pub fn insert(&mut self, entry: HierarchyEntry) -> Result<()> {
        let phrase = entry.phrase.trim().to_lowercase();

        match entry.level {
            level if level == 0 || level > MAX_LEVEL => {
                return Err(CoreError::InvalidLevel {
                    sequence_id: entry.sequence_id,
                    level,
                })
            }
            1 => {
                let sequences = self.entry_points.entry(phrase).or_default();
                if !sequences.contains(&entry.sequence_id) {
                    sequences.push(entry.sequence_id.clone());
                }
                self.concepts.insert(entry.sequence_id, entry.concept_id);
            }
            level => {
                let index = level - 2;
                if self.continuations.len() <= index {
                    self.continuations.resize_with(index + 1, HashMap::new);
                }
                self.continuations[index]
                    .entry(entry.sequence_id)
                    .or_default()
                    .push(phrase);
            }
        }

        Ok(())
    }

    /// Number of levels including the concept level 0
    pub fn levels(&self) -> usize {
        2 + self.continuations.len()
    }

    /// Number of sequences with a resolvable concept
    pub fn sequence_count(&self) -> usize {
        self.concepts.len()
    }

    /// Number of distinct entry phrases
    pub fn entry_phrase_count(&self) -> usize {
        self.entry_points.len()
    }

    /// Concept resolved by a sequence
    pub fn concept_of(&self, sequence_id: &str) -> Option<ConceptId> {
        self.concepts.get(sequence_id).copied()
    }

    /// Every phrase at every level, sorted, for building a phrase spotter
    pub fn vocabulary(&self) -> BTreeSet<&str> {
        self.entry_points
            .keys()
            .map(String::as_str)
            .chain(
                self.continuations
                    .iter()
                    .flat_map(|level| level.values().flatten().map(String::as_str)),
            )
            .collect()
    }

    /// Distinct concept ids across all sequences
    pub fn concept_ids(&self) -> BTreeSet<ConceptId> {
        self.concepts.values().copied().collect()
    }

    /// Resolve one sentence's phrase hits into trigger chains.
    ///
    /// Hits are sorted by position first, so the result does not depend on
    /// input order. Continuations always take the leftmost qualifying hit.
    /// Identical `(concept, chain)` resolutions are reported once.
    pub fn resolve(&self, hits: &[PhraseHit]) -> Vec<Resolution> {
        let mut sorted: Vec<&PhraseHit> = hits.iter().collect();
        sorted.sort();
        let keys: Vec<String> = sorted.iter().map(|hit| hit.key()).collect();

        let mut resolutions: Vec<Resolution> = Vec::new();
        for (head, key) in keys.iter().enumerate() {
            let Some(sequences) = self.entry_points.get(key) else {
                continue;
            };

            for sequence_id in sequences {
                let Some(continuation) = self.walk(sequence_id, &keys) else {
                    continue;
                };
                let Some(concept_id) = self.concept_of(sequence_id) else {
                    log::trace!("sequence '{sequence_id}' has no concept, skipping");
                    continue;
                };

                let mut chain: Vec<PhraseHit> = std::iter::once(head)
                    .chain(continuation)
                    .map(|index| sorted[index].clone())
                    .collect();
                chain.sort_by_key(|hit| hit.span);
                chain.dedup();

                let resolution = Resolution { concept_id, chain };
                if !resolutions.contains(&resolution) {
                    resolutions.push(resolution);
                }
            }
        }

        resolutions
    }

    /// Resolve a sentence straight into labeled entities
    pub fn resolve_entities(&self, hits: &[PhraseHit], concepts: &ConceptMap) -> Vec<ConditionEntity> {
        self.resolve(hits)
            .into_iter()
            .map(|resolution| resolution.into_entity(concepts))
            .collect()
    }

    /// Walk levels 2.. for a sequence, returning the indices of the
    /// continuation hits, or `None` when some level cannot be satisfied
    fn walk(&self, sequence_id: &str, keys: &[String]) -> Option<Vec<usize>> {
        let mut picked = Vec::new();
        for level in &self.continuations {
            // no phrases at this depth: the sequence is complete
            let Some(phrases) = level.get(sequence_id) else {
                break;
            };
            let index = keys.iter().position(|key| phrases.contains(key))?;
            picked.push(index);
        }
        Some(picked)
    }
}

/// A fully matched sequence within one sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Concept resolved by the sequence
    pub concept_id: ConceptId,
    /// Contributing hits ordered by start offset
    pub chain: Vec<PhraseHit>,
}

impl Resolution {
    /// Label the resolution and turn it into an entity headed by its
    /// leftmost hit
    pub fn into_entity(self, concepts: &ConceptMap) -> ConditionEntity {
        let triggers = self
            .chain
            .iter()
            .map(|hit| hit.text.as_str())
            .collect::<Vec<_>>()
            .join(TRIGGER_SEPARATOR);
        let span = self.chain.first().map(|hit| hit.span).unwrap_or_default();

        ConditionEntity {
            span,
            concept_id: self.concept_id,
            tag: concepts.label(self.concept_id, None),
            triggers,
            chain: self
                .chain
                .into_iter()
                .map(|hit| TriggerNode {
                    span: hit.span,
                    text: hit.text,
                })
                .collect(),
        }
    }
}

/// One contributing phrase of a resolved condition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerNode {
    /// Location of the phrase
    pub span: Span,
    /// Phrase text as it appears in the document
    pub text: String,
}

/// A resolved clinical condition
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionEntity {
    /// Span of the head trigger
    pub span: Span,
    /// Resolved concept
    pub concept_id: ConceptId,
    /// Display name of the concept
    pub tag: String,
    /// All trigger texts joined with `", "`
    pub triggers: String,
    /// Contributing phrases ordered by start offset, head first
    pub chain: Vec<TriggerNode>,
}

impl ConditionEntity {
    /// Chain length; the head alone has depth 1
    pub fn depth(&self) -> usize {
        self.chain.len().max(1)
    }

    /// Spans of every node in the chain
    pub fn token_spans(&self) -> Vec<Span> {
        self.chain.iter().map(|node| node.span).collect()
    }

    /// Every byte position covered by any node of the chain
    pub fn covered_positions(&self) -> HashSet<usize> {
        self.chain
            .iter()
            .flat_map(|node| node.span.start..node.span.end)
            .collect()
    }

    /// The trigger string split back into its words
    pub fn trigger_words(&self) -> HashSet<&str> {
        self.triggers.split(TRIGGER_SEPARATOR).collect()
    }
}
