//! Sentence-grouped summaries shared by every detector
//!
//! Shape: `category -> label -> {concept_id, sentences: [{sentBound, tokens}]}`.
//! Sentence bounds and tokens serialize as `[start, end]` pairs.

use crate::hierarchy::ConditionEntity;
use crate::types::{ConceptId, SentenceGroup, Span};
use std::collections::BTreeMap;

/// Category assigned to resolved conditions
pub const CONDITION_CATEGORY: &str = "condition";

/// Anything that can be folded into a [`Summary`]
pub trait Summarize {
    /// Top-level grouping key
    fn category(&self) -> &str;

    /// Concept display name
    fn label(&self) -> &str;

    /// Concept id
    fn concept_id(&self) -> ConceptId;

    /// Spans of every contributing token
    fn token_spans(&self) -> Vec<Span>;
}

impl Summarize for ConditionEntity {
    fn category(&self) -> &str {
        CONDITION_CATEGORY
    }

    fn label(&self) -> &str {
        &self.tag
    }

    fn concept_id(&self) -> ConceptId {
        self.concept_id
    }

    fn token_spans(&self) -> Vec<Span> {
        ConditionEntity::token_spans(self)
    }
}

/// Tokens of one concept within one sentence
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SentenceSummary {
    /// Sentence boundary
    #[cfg_attr(feature = "serde", serde(rename = "sentBound", with = "pairs"))]
    pub sent_bound: Span,
    /// Token spans in first-seen order, duplicates kept
    #[cfg_attr(feature = "serde", serde(with = "pairs::list"))]
    pub tokens: Vec<Span>,
}

#[cfg(feature = "serde")]
mod pairs {
    use crate::types::Span;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(span: &Span, serializer: S) -> Result<S::Ok, S::Error> {
        (span.start, span.end).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Span, D::Error> {
        let (start, end) = <(usize, usize)>::deserialize(deserializer)?;
        Ok(Span::new(start, end))
    }

    pub mod list {
        use crate::types::Span;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(spans: &[Span], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(spans.iter().map(|span| (span.start, span.end)))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Span>, D::Error> {
            let pairs = Vec::<(usize, usize)>::deserialize(deserializer)?;
            Ok(pairs.into_iter().map(|(start, end)| Span::new(start, end)).collect())
        }
    }
}

/// Every sentence mentioning one concept
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptSummary {
    /// Concept id
    pub concept_id: ConceptId,
    /// Sentences ordered by boundary
    pub sentences: Vec<SentenceSummary>,
}

/// Concept-grouped summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Summary {
    categories: BTreeMap<String, BTreeMap<String, ConceptSummary>>,
}

impl Summary {
    /// Empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Summarize sentence-grouped items
    pub fn from_groups<T: Summarize>(groups: &[SentenceGroup<T>]) -> Self {
        let mut summary = Self::new();
        for group in groups {
            for item in &group.items {
                summary.add(group.sentence, item);
            }
        }
        summary.sort_sentences();
        summary
    }

    /// Record one item found in `sentence`. The first concept id seen for a
    /// label is kept.
    fn add<T: Summarize>(&mut self, sentence: Span, item: &T) {
        let concept = self
            .categories
            .entry(item.category().to_string())
            .or_default()
            .entry(item.label().to_string())
            .or_insert_with(|| ConceptSummary {
                concept_id: item.concept_id(),
                sentences: Vec::new(),
            });

        let tokens = item.token_spans();
        match concept.sentences.iter_mut().find(|s| s.sent_bound == sentence) {
            Some(existing) => existing.tokens.extend(tokens),
            None => concept.sentences.push(SentenceSummary {
                sent_bound: sentence,
                tokens,
            }),
        }
    }

    fn sort_sentences(&mut self) {
        for concept in self.categories.values_mut().flat_map(BTreeMap::values_mut) {
            concept.sentences.sort_by_key(|s| s.sent_bound);
        }
    }

    /// True when nothing was summarized
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Category names in order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Labels of one category
    pub fn category(&self, category: &str) -> Option<&BTreeMap<String, ConceptSummary>> {
        self.categories.get(category)
    }

    /// Summary of one concept label
    pub fn get(&self, category: &str, label: &str) -> Option<&ConceptSummary> {
        self.categories.get(category)?.get(label)
    }

    /// Fold another summary into this one
    pub fn merge(&mut self, other: Summary) {
        for (category, labels) in other.categories {
            let target = self.categories.entry(category).or_default();
            for (label, concept) in labels {
                match target.get_mut(&label) {
                    Some(existing) => {
                        for sentence in concept.sentences {
                            match existing.sentences.iter_mut().find(|s| s.sent_bound == sentence.sent_bound) {
                                Some(found) => found.tokens.extend(sentence.tokens),
                                None => existing.sentences.push(sentence),
                            }
                        }
                    }
                    None => {
                        target.insert(label, concept);
                    }
                }
            }
        }
        self.sort_sentences();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        category: &'static str,
        label: &'static str,
        id: ConceptId,
        spans: Vec<Span>,
    }

    impl Summarize for Item {
        fn category(&self) -> &str {
            self.category
        }
        fn label(&self) -> &str {
            self.label
        }
        fn concept_id(&self) -> ConceptId {
            self.id
        }
        fn token_spans(&self) -> Vec<Span> {
            self.spans.clone()
        }
    }

    fn item(label: &'static str, id: ConceptId, start: usize, end: usize) -> Item {
        Item {
            category: "smoking",
            label,
            id,
            spans: vec![Span::new(start, end)],
        }
    }

    #[test]
    fn test_groups_by_label_and_sentence() {
        let groups = vec![
            SentenceGroup::new(Span::new(20, 40), vec![item("Smoker", 1, 22, 28)]),
            SentenceGroup::new(Span::new(0, 15), vec![item("Smoker", 1, 2, 8), item("Smoker", 1, 2, 8)]),
        ];
        let summary = Summary::from_groups(&groups);
        let smoker = summary.get("smoking", "Smoker").unwrap();

        assert_eq!(smoker.concept_id, 1);
        assert_eq!(smoker.sentences.len(), 2);
        // ordered by sentence boundary, tokens concatenated without dedup
        assert_eq!(smoker.sentences[0].sent_bound, Span::new(0, 15));
        assert_eq!(smoker.sentences[0].tokens, vec![Span::new(2, 8), Span::new(2, 8)]);
        assert_eq!(smoker.sentences[1].tokens, vec![Span::new(22, 28)]);
    }

    #[test]
    fn test_merge_combines_sentences() {
        let mut a = Summary::from_groups(&[SentenceGroup::new(Span::new(0, 10), vec![item("Smoker", 1, 0, 3)])]);
        let b = Summary::from_groups(&[
            SentenceGroup::new(Span::new(0, 10), vec![item("Smoker", 1, 5, 8)]),
            SentenceGroup::new(Span::new(10, 20), vec![item("Non-smoker", 2, 11, 14)]),
        ]);
        a.merge(b);

        assert_eq!(a.get("smoking", "Smoker").unwrap().sentences[0].tokens.len(), 2);
        assert!(a.get("smoking", "Non-smoker").is_some());
        assert_eq!(a.categories().collect::<Vec<_>>(), vec!["smoking"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialized_shape() {
        let summary = Summary::from_groups(&[SentenceGroup::new(Span::new(0, 10), vec![item("Smoker", 1, 0, 3)])]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["smoking"]["Smoker"]["concept_id"], 1);
        let sentence = &json["smoking"]["Smoker"]["sentences"][0];
        assert_eq!(sentence["sentBound"], serde_json::json!([0, 10]));
        assert_eq!(sentence["tokens"], serde_json::json!([[0, 3]]));

        let back: Summary = serde_json::from_value(json).unwrap();
        assert_eq!(back, summary);
    }
}
