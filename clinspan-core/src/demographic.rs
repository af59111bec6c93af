//! Single-level demographic phrase matching

use crate::concept::ConceptMap;
use crate::summary::Summarize;
use crate::types::{ConceptId, PhraseHit, Span};
use std::collections::{BTreeSet, HashMap};

/// One demographic rule: a concept and the phrases that express it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemographicRule {
    /// Concept id
    pub concept_id: ConceptId,
    /// Category the concept is summarized under
    pub category: String,
    /// Fallback display name
    pub label: String,
    /// Phrases, matched case-insensitively
    pub phrases: Vec<String>,
}

/// Category and resolved display name of a demographic concept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemographicConcept {
    /// Category
    pub category: String,
    /// Display name
    pub label: String,
}

/// Phrase to demographic concept lookup
#[derive(Debug, Clone, Default)]
pub struct DemographicLexicon {
    phrases: HashMap<String, Vec<ConceptId>>,
    concepts: HashMap<ConceptId, DemographicConcept>,
}

impl DemographicLexicon {
    /// Empty lexicon
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from rules, naming concepts through `names` first, then the
    /// rule label, then the id
    pub fn from_rules(rules: impl IntoIterator<Item = DemographicRule>, names: &ConceptMap) -> Self {
        let mut lexicon = Self::new();
        for rule in rules {
            lexicon.insert(rule, names);
        }
        lexicon
    }

    /// Register a rule; a later rule for the same concept replaces its
    /// category and label
    pub fn insert(&mut self, rule: DemographicRule, names: &ConceptMap) {
        let label = names.label(rule.concept_id, Some(&rule.label));
        self.concepts.insert(
            rule.concept_id,
            DemographicConcept {
                category: rule.category,
                label,
            },
        );

        for phrase in rule.phrases {
            let key = phrase.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            let ids = self.phrases.entry(key).or_default();
            if !ids.contains(&rule.concept_id) {
                ids.push(rule.concept_id);
            }
        }
    }

    /// Number of concepts
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// True when no rules are registered
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Concept details
    pub fn concept(&self, id: ConceptId) -> Option<&DemographicConcept> {
        self.concepts.get(&id)
    }

    /// Every registered phrase, sorted
    pub fn vocabulary(&self) -> BTreeSet<&str> {
        self.phrases.keys().map(String::as_str).collect()
    }

    /// Map phrase hits to demographic hits; one hit per matching concept
    pub fn match_hits(&self, hits: &[PhraseHit]) -> Vec<DemographicHit> {
        let mut output = Vec::new();
        for hit in hits {
            let Some(ids) = self.phrases.get(&hit.key()) else {
                continue;
            };
            for id in ids {
                if let Some(concept) = self.concepts.get(id) {
                    output.push(DemographicHit {
                        span: hit.span,
                        text: hit.text.clone(),
                        concept_id: *id,
                        category: concept.category.clone(),
                        label: concept.label.clone(),
                    });
                }
            }
        }
        output
    }
}

/// A matched demographic fact
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DemographicHit {
    /// Location of the phrase
    pub span: Span,
    /// Phrase text as it appears in the document
    pub text: String,
    /// Concept id
    pub concept_id: ConceptId,
    /// Concept category
    pub category: String,
    /// Concept display name
    pub label: String,
}

impl Summarize for DemographicHit {
    fn category(&self) -> &str {
        &self.category
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn concept_id(&self) -> ConceptId {
        self.concept_id
    }

    fn token_spans(&self) -> Vec<Span> {
        vec![self.span]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: ConceptId, category: &str, label: &str, phrases: &[&str]) -> DemographicRule {
        DemographicRule {
            concept_id: id,
            category: category.to_string(),
            label: label.to_string(),
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_label_prefers_concept_table() {
        let names: ConceptMap = vec![(4298794, "Smoker".to_string())].into_iter().collect();
        let lexicon = DemographicLexicon::from_rules(
            vec![
                rule(4298794, "smoking", "current smoker", &["smokes"]),
                rule(4144272, "smoking", "Former smoker", &["quit smoking"]),
                rule(99, "gender", "", &["female"]),
            ],
            &names,
        );

        assert_eq!(lexicon.concept(4298794).unwrap().label, "Smoker");
        assert_eq!(lexicon.concept(4144272).unwrap().label, "Former smoker");
        assert_eq!(lexicon.concept(99).unwrap().label, "99");
    }

    #[test]
    fn test_match_hits_case_insensitive() {
        let lexicon = DemographicLexicon::from_rules(vec![rule(1, "gender", "Female", &["Female", "woman"])], &ConceptMap::new());
        let hits = lexicon.match_hits(&[
            PhraseHit::new(Span::new(0, 5), "WOMAN"),
            PhraseHit::new(Span::new(10, 15), "adult"),
        ]);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, "gender");
        assert_eq!(hits[0].text, "WOMAN");
    }

    #[test]
    fn test_shared_phrase_yields_each_concept() {
        let lexicon = DemographicLexicon::from_rules(
            vec![rule(1, "a", "A", &["widow"]), rule(2, "b", "B", &["widow"])],
            &ConceptMap::new(),
        );
        let hits = lexicon.match_hits(&[PhraseHit::new(Span::new(0, 5), "widow")]);
        assert_eq!(hits.iter().map(|h| h.concept_id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
