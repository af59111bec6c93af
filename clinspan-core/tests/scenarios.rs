//! End-to-end resolution scenarios over hand-built documents

use clinspan_core::{
    negation_index, AnnotationResolver, ConceptMap, ConditionHierarchy, HierarchyEntry, NegationKind,
    NegationMatch, PhraseHit, SectionHeaderMap, Span,
};

const CHEST_PAIN: i64 = 77670;
const HEADACHE: i64 = 378253;
const ESSENTIAL_HTN: i64 = 320128;
const HTN: i64 = 316866;

fn resolver() -> AnnotationResolver {
    let hierarchy = ConditionHierarchy::from_entries(vec![
        HierarchyEntry::new("CP", CHEST_PAIN, 1, "chest pain"),
        HierarchyEntry::new("HA", HEADACHE, 1, "headache"),
        HierarchyEntry::new("EH", ESSENTIAL_HTN, 1, "hypertension"),
        HierarchyEntry::new("EH", ESSENTIAL_HTN, 2, "essential"),
        HierarchyEntry::new("H", HTN, 1, "hypertension"),
    ])
    .unwrap();
    let concepts: ConceptMap = vec![
        (CHEST_PAIN, "Chest pain".to_string()),
        (HEADACHE, "Headache".to_string()),
        (ESSENTIAL_HTN, "Essential hypertension".to_string()),
        (HTN, "Hypertensive disorder".to_string()),
    ]
    .into_iter()
    .collect();
    AnnotationResolver::new(hierarchy, concepts)
}

fn span_of(text: &str, needle: &str) -> Span {
    let start = text.find(needle).unwrap();
    Span::new(start, start + needle.len())
}

fn hit(text: &str, needle: &str) -> PhraseHit {
    let span = span_of(text, needle);
    PhraseHit::new(span, &text[span.start..span.end])
}

#[test]
fn test_forward_negation_removes_condition() {
    let text = "Patient denies chest pain.";
    let sentences = vec![Span::new(0, text.len())];
    let negation = negation_index(
        &sentences,
        &[NegationMatch::new(span_of(text, "denies"), NegationKind::Forward)],
    );

    let result = resolver().resolve_conditions(&sentences, &[], &[hit(text, "chest pain")], &negation);

    assert!(result.facts.iter().all(|sentence| sentence.codes.is_empty()));
    assert_eq!(result.negated.len(), 1);
    assert_eq!(result.negated[0].scope.span, Span::new(8, text.len()));
}

#[test]
fn test_closure_limits_negation() {
    let text = "No chest pain, but severe headache.";
    let sentences = vec![Span::new(0, text.len())];
    let negation = negation_index(
        &sentences,
        &[
            NegationMatch::new(span_of(text, "No"), NegationKind::Forward),
            NegationMatch::new(span_of(text, ","), NegationKind::Closure),
            NegationMatch::new(span_of(text, "but"), NegationKind::Closure),
        ],
    );

    let result = resolver().resolve_conditions(
        &sentences,
        &[],
        &[hit(text, "chest pain"), hit(text, "headache")],
        &negation,
    );

    let tags: Vec<_> = result.facts.iter().flat_map(|s| &s.codes).map(|c| c.tag.as_str()).collect();
    assert_eq!(tags, vec!["Headache"]);
    assert_eq!(result.negated[0].entity.concept_id, CHEST_PAIN);
}

#[test]
fn test_compound_condition_resolves_and_absorbs_nested() {
    let text = "Essential hypertension noted.";
    let sentences = vec![Span::new(0, text.len())];
    let negation = negation_index(&sentences, &[]);

    let result = resolver().resolve_conditions(
        &sentences,
        &[],
        &[hit(text, "hypertension"), hit(text, "Essential")],
        &negation,
    );

    // the single-word hypertensive disorder is nested in the compound
    assert_eq!(result.groups.len(), 1);
    let entities = &result.groups[0].items;
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].concept_id, ESSENTIAL_HTN);
    assert_eq!(entities[0].tag, "Essential hypertension");
    assert_eq!(entities[0].triggers, "Essential, hypertension");
    assert_eq!(entities[0].chain.len(), 2);

    let summary = result.summary.get("condition", "Essential hypertension").unwrap();
    assert_eq!(summary.sentences[0].tokens, vec![Span::new(0, 9), Span::new(10, 22)]);
    assert!(result.summary.get("condition", "Hypertensive disorder").is_none());
}

#[test]
fn test_family_history_section_suppressed() {
    let text = "Family History: mother had headache.\nAssessment: headache today.";
    let sections = SectionHeaderMap::new(vec![("fam_history", "family history"), ("assessment", "assessment")])
        .unwrap()
        .resolve(text);
    let split = text.find('\n').unwrap();
    let sentences = vec![Span::new(0, split), Span::new(split + 1, text.len())];

    let first = span_of(text, "headache");
    let second_start = text.rfind("headache").unwrap();
    let hits = vec![
        PhraseHit::new(first, "headache"),
        PhraseHit::new(Span::new(second_start, second_start + 8), "headache"),
    ];
    let negation = negation_index(&sentences, &[]);

    let result = resolver().resolve_conditions(&sentences, &sections, &hits, &negation);

    assert_eq!(result.facts.len(), 1);
    assert_eq!(result.facts[0].start, split + 1);
    assert_eq!(result.facts[0].codes[0].start, second_start);
}

#[test]
fn test_hits_outside_sentences_are_dropped() {
    let text = "headache";
    let result = resolver().resolve_conditions(
        &[],
        &[],
        &[hit(text, "headache")],
        &negation_index(&[], &[]),
    );
    assert!(result.facts.is_empty());
    assert!(result.summary.is_empty());
}
