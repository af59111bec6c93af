//! Post-processing of resolved conditions
//!
//! Drops sentences that fall in ignored sections, removes entities nested in
//! more complete ones, then flattens survivors into per-sentence facts.

use crate::hierarchy::ConditionEntity;
use crate::interval::IntervalIndex;
use crate::types::{ConceptId, SectionSpan, SentenceGroup, Span};
use std::cmp::Ordering;

/// Section types suppressed when no list is configured
pub const DEFAULT_IGNORED_SECTIONS: &[&str] = &["fam_history"];

/// Drop every sentence group whose sentence lies in an ignored section.
///
/// The section consulted is the first overlapping one by start offset.
/// Sentences overlapping no section, or an untyped one, are kept.
pub fn drop_ignored_sections<T, S>(
    groups: Vec<SentenceGroup<T>>,
    sections: &[SectionSpan],
    ignored: &[S],
) -> Vec<SentenceGroup<T>>
where
    S: AsRef<str>,
{
    if ignored.is_empty() {
        return groups;
    }

    let index = IntervalIndex::new(sections.iter().map(|section| (section.span, section.kind.as_deref())));
    groups
        .into_iter()
        .filter(|group| {
            let kind = index.first_overlap(group.sentence).and_then(|(_, kind)| *kind);
            let drop = kind.is_some_and(|kind| ignored.iter().any(|i| i.as_ref() == kind));
            if drop {
                log::trace!(
                    "sentence {}..{} in ignored section {:?}, dropping {} item(s)",
                    group.sentence.start,
                    group.sentence.end,
                    kind,
                    group.items.len()
                );
            }
            !drop
        })
        .collect()
}

/// Strict-superset comparison of two sets: `Greater` when `a ⊋ b`,
/// `Less` when `a ⊊ b`, `Equal` otherwise
fn nesting<T: Eq + std::hash::Hash>(
    a: &std::collections::HashSet<T>,
    b: &std::collections::HashSet<T>,
) -> Ordering {
    if a.len() > b.len() && a.is_superset(b) {
        Ordering::Greater
    } else if a.len() < b.len() && a.is_subset(b) {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

/// Remove entities whose coverage is nested in another entity of the same
/// sentence.
///
/// Entities are ordered by chain depth, deepest first. Every pair is compared
/// on covered byte positions; when neither strictly contains the other, the
/// trigger-word sets decide. Removed entities still take part in later
/// comparisons. Survivors keep the depth ordering.
pub fn filter_nested(entities: Vec<ConditionEntity>) -> Vec<ConditionEntity> {
    let mut sorted = entities;
    sorted.sort_by_key(|entity| std::cmp::Reverse(entity.depth()));

    let coverage: Vec<_> = sorted.iter().map(ConditionEntity::covered_positions).collect();
    let words: Vec<_> = sorted.iter().map(ConditionEntity::trigger_words).collect();
    let mut removed = vec![false; sorted.len()];

    for i in 0..sorted.len() {
        for j in i + 1..sorted.len() {
            let order = match nesting(&coverage[i], &coverage[j]) {
                Ordering::Equal => nesting(&words[i], &words[j]),
                decided => decided,
            };
            match order {
                Ordering::Greater => removed[j] = true,
                Ordering::Less => removed[i] = true,
                Ordering::Equal => {}
            }
        }
    }

    sorted
        .into_iter()
        .zip(removed)
        .filter_map(|(entity, removed)| (!removed).then_some(entity))
        .collect()
}

/// Apply [`filter_nested`] to every sentence group
pub fn filter_nested_groups(groups: Vec<SentenceGroup<ConditionEntity>>) -> Vec<SentenceGroup<ConditionEntity>> {
    groups
        .into_iter()
        .map(|group| SentenceGroup::new(group.sentence, filter_nested(group.items)))
        .collect()
}

/// Flattened condition fact
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactRecord {
    /// Head trigger start
    pub start: usize,
    /// Head trigger end
    pub end: usize,
    /// Concept display name
    pub tag: String,
    /// Concept id
    pub concept_id: ConceptId,
    /// Joined trigger texts
    pub triggers: String,
}

impl From<&ConditionEntity> for FactRecord {
    fn from(entity: &ConditionEntity) -> Self {
        Self {
            start: entity.span.start,
            end: entity.span.end,
            tag: entity.tag.clone(),
            concept_id: entity.concept_id,
            triggers: entity.triggers.clone(),
        }
    }
}

/// All facts of one sentence
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SentenceFacts {
    /// Sentence start
    pub start: usize,
    /// Sentence end
    pub end: usize,
    /// Facts in the sentence
    pub codes: Vec<FactRecord>,
}

impl SentenceFacts {
    /// Sentence boundary as a span
    pub fn sentence(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// One record per sentence group
pub fn flatten(groups: &[SentenceGroup<ConditionEntity>]) -> Vec<SentenceFacts> {
    groups
        .iter()
        .map(|group| SentenceFacts {
            start: group.sentence.start,
            end: group.sentence.end,
            codes: group.items.iter().map(FactRecord::from).collect(),
        })
        .collect()
}
