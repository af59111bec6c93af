//! The resolution stage: raw hits in, per-sentence facts out
//!
//! ```text
//! phrase hits -> group by sentence -> trigger chains -> negation
//!             -> ignored sections -> nested filter -> facts + summary
//! ```

use crate::concept::ConceptMap;
use crate::demographic::{DemographicHit, DemographicLexicon};
use crate::hierarchy::{ConditionEntity, ConditionHierarchy};
use crate::negation::{document_scopes, NegationIndex, NegationScope};
use crate::postprocess::{
    drop_ignored_sections, filter_nested_groups, flatten, SentenceFacts, DEFAULT_IGNORED_SECTIONS,
};
use crate::summary::Summary;
use crate::types::{group_by_sentence, NegationMatch, PhraseHit, SectionSpan, SentenceGroup, Span};

/// A condition removed by negation, with the scope responsible
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NegatedEntity {
    /// The removed condition
    pub entity: ConditionEntity,
    /// First scope it overlapped
    pub scope: NegationScope,
}

/// Output of condition resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionResolution {
    /// Surviving conditions per sentence
    pub groups: Vec<SentenceGroup<ConditionEntity>>,
    /// Flattened per-sentence facts
    pub facts: Vec<SentenceFacts>,
    /// Concept-grouped summary of the survivors
    pub summary: Summary,
    /// Conditions removed by negation
    pub negated: Vec<NegatedEntity>,
}

/// Output of demographic matching
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemographicResolution {
    /// Accepted hits per sentence
    pub groups: Vec<SentenceGroup<DemographicHit>>,
    /// Concept-grouped summary
    pub summary: Summary,
}

/// Read-only resolver over a condition knowledge base
#[derive(Debug, Clone)]
pub struct AnnotationResolver {
    hierarchy: ConditionHierarchy,
    concepts: ConceptMap,
    ignored_sections: Vec<String>,
}

impl AnnotationResolver {
    /// Create a resolver suppressing the default ignored sections
    pub fn new(hierarchy: ConditionHierarchy, concepts: ConceptMap) -> Self {
        Self {
            hierarchy,
            concepts,
            ignored_sections: DEFAULT_IGNORED_SECTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the ignored section types
    pub fn with_ignored_sections<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_sections = sections.into_iter().map(Into::into).collect();
        self
    }

    /// The condition knowledge base
    pub fn hierarchy(&self) -> &ConditionHierarchy {
        &self.hierarchy
    }

    /// Concept names
    pub fn concepts(&self) -> &ConceptMap {
        &self.concepts
    }

    /// Section types whose sentences are suppressed
    pub fn ignored_sections(&self) -> &[String] {
        &self.ignored_sections
    }

    /// Resolve one document's condition hits.
    ///
    /// Sentences left without surviving conditions are omitted from the
    /// output.
    pub fn resolve_conditions(
        &self,
        sentences: &[Span],
        sections: &[SectionSpan],
        hits: &[PhraseHit],
        negation: &NegationIndex,
    ) -> ConditionResolution {
        let mut negated = Vec::new();
        let mut groups = Vec::new();

        for group in group_by_sentence(sentences, hits.to_vec(), |hit| hit.span) {
            let entities = self.hierarchy.resolve_entities(&group.items, &self.concepts);
            let (kept, removed) = negation.partition(entities, |entity| entity.span);
            negated.extend(removed.into_iter().map(|(entity, scope)| NegatedEntity { entity, scope }));
            groups.push(SentenceGroup::new(group.sentence, kept));
        }

        let groups = drop_ignored_sections(groups, sections, &self.ignored_sections);
        let groups: Vec<_> = filter_nested_groups(groups)
            .into_iter()
            .filter(|group| !group.items.is_empty())
            .collect();

        log::debug!(
            "resolved {} condition(s) in {} sentence(s), {} negated",
            groups.iter().map(|g| g.items.len()).sum::<usize>(),
            groups.len(),
            negated.len()
        );

        ConditionResolution {
            facts: flatten(&groups),
            summary: Summary::from_groups(&groups),
            groups,
            negated,
        }
    }
}

/// Negation scopes of a document, indexed for overlap lookups
pub fn negation_index(sentences: &[Span], matches: &[NegationMatch]) -> NegationIndex {
    NegationIndex::new(document_scopes(sentences, matches))
}

/// Match demographic hits per sentence, optionally dropping negated ones
pub fn resolve_demographics(
    lexicon: &DemographicLexicon,
    sentences: &[Span],
    hits: &[PhraseHit],
    negation: Option<&NegationIndex>,
) -> DemographicResolution {
    let mut matched = lexicon.match_hits(hits);
    if let Some(index) = negation {
        matched.retain(|hit| !index.is_negated(hit.span));
    }

    let groups = group_by_sentence(sentences, matched, |hit| hit.span);
    DemographicResolution {
        summary: Summary::from_groups(&groups),
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demographic::DemographicRule;
    use crate::hierarchy::HierarchyEntry;
    use crate::types::NegationKind;

    fn resolver() -> AnnotationResolver {
        let hierarchy = ConditionHierarchy::from_entries(vec![
            HierarchyEntry::new("S1", 10, 1, "chest pain"),
            HierarchyEntry::new("S2", 20, 1, "headache"),
        ])
        .unwrap();
        let concepts: ConceptMap = vec![(10, "Chest pain".to_string()), (20, "Headache".to_string())]
            .into_iter()
            .collect();
        AnnotationResolver::new(hierarchy, concepts)
    }

    fn find(text: &str, needle: &str) -> Span {
        let start = text.find(needle).unwrap();
        Span::new(start, start + needle.len())
    }

    #[test]
    fn test_negated_conditions_reported_separately() {
        let text = "No chest pain, but severe headache.";
        let sentences = vec![Span::new(0, text.len())];
        let hits = vec![
            PhraseHit::new(find(text, "chest pain"), "chest pain"),
            PhraseHit::new(find(text, "headache"), "headache"),
        ];
        let negation = negation_index(
            &sentences,
            &[
                NegationMatch::new(find(text, "No"), NegationKind::Forward),
                NegationMatch::new(find(text, ","), NegationKind::Closure),
                NegationMatch::new(find(text, "but"), NegationKind::Closure),
            ],
        );

        let result = resolver().resolve_conditions(&sentences, &[], &hits, &negation);

        assert_eq!(result.facts.len(), 1);
        assert_eq!(result.facts[0].codes[0].tag, "Headache");
        assert_eq!(result.negated.len(), 1);
        assert_eq!(result.negated[0].entity.tag, "Chest pain");
        assert!(result.summary.get("condition", "Headache").is_some());
    }

    #[test]
    fn test_ignored_sections_configurable() {
        let text = "Plan:\nheadache";
        let sentences = vec![Span::new(0, 5), Span::new(6, 14)];
        let sections = vec![SectionSpan {
            span: Span::new(0, 14),
            kind: Some("plan".to_string()),
        }];
        let hits = vec![PhraseHit::new(Span::new(6, 14), "headache")];
        let empty = NegationIndex::new(Vec::new());

        let kept = resolver().resolve_conditions(&sentences, &sections, &hits, &empty);
        assert_eq!(kept.facts.len(), 1);

        let dropped = resolver()
            .with_ignored_sections(["plan"])
            .resolve_conditions(&sentences, &sections, &hits, &empty);
        assert!(dropped.facts.is_empty());
        assert!(dropped.summary.is_empty());
    }

    #[test]
    fn test_demographics_negated_only_on_request() {
        let lexicon = DemographicLexicon::from_rules(
            vec![DemographicRule {
                concept_id: 5,
                category: "smoking".to_string(),
                label: "Smoker".to_string(),
                phrases: vec!["smoker".to_string()],
            }],
            &ConceptMap::new(),
        );
        let sentences = vec![Span::new(0, 13)];
        let hits = vec![PhraseHit::new(Span::new(7, 13), "smoker")];
        let negation = negation_index(&sentences, &[NegationMatch::new(Span::new(0, 3), NegationKind::Forward)]);

        let plain = resolve_demographics(&lexicon, &sentences, &hits, None);
        assert_eq!(plain.groups[0].items.len(), 1);
        assert_eq!(plain.summary.get("smoking", "Smoker").unwrap().concept_id, 5);

        let negated = resolve_demographics(&lexicon, &sentences, &hits, Some(&negation));
        assert!(negated.groups.is_empty());
    }
}
