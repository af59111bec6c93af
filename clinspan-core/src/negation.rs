//! Negation scope resolution
//!
//! Directional negation terms open a scope inside their sentence; closure
//! markers (contrastive conjunctions, commas) clip those scopes toward the
//! term. Anything overlapping a final scope is negated.

use crate::interval::IntervalIndex;
use crate::types::{group_by_sentence, NegationKind, NegationMatch, Span};

/// A computed negation scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NegationScope {
    /// Region considered negated
    pub span: Span,
    /// The negation term that opened the scope
    pub trigger: NegationMatch,
}

/// Initial scope of a term before closure clipping, `None` for closures.
///
/// Scopes never leave the sentence, even for a term that straddles a
/// sentence boundary.
pub fn directional_scope(term: &NegationMatch, sentence: Span) -> Option<Span> {
    match term.kind {
        NegationKind::Forward => Some(Span::new(term.span.start.max(sentence.start), sentence.end)),
        NegationKind::Backward => Some(Span::new(sentence.start, term.span.end.min(sentence.end))),
        NegationKind::Bidirectional => Some(sentence),
        NegationKind::Closure => None,
    }
}

/// Clip `scope` with each closure in turn.
///
/// A closure raises the start when it begins strictly between the scope start
/// and the term start, otherwise lowers the end when it ends strictly between
/// the term end and the scope end. One boundary per closure, never both.
pub fn clip_scope(mut scope: Span, term: Span, closures: &[Span]) -> Span {
    for closure in closures {
        if closure.start < term.start && closure.start > scope.start {
            scope.start = closure.start;
        } else if closure.end > term.end && closure.end < scope.end {
            scope.end = closure.end;
        }
    }
    scope
}

/// Scopes of one sentence's negation matches.
///
/// Only closures lying inside the sentence participate. Empty scopes are
/// dropped since they can never overlap anything.
pub fn sentence_scopes(sentence: Span, matches: &[NegationMatch]) -> Vec<NegationScope> {
    let (closures, terms): (Vec<&NegationMatch>, Vec<&NegationMatch>) =
        matches.iter().partition(|m| m.kind == NegationKind::Closure);
    let closures: Vec<Span> = closures
        .into_iter()
        .map(|m| m.span)
        .filter(|span| sentence.contains(span))
        .collect();

    terms
        .into_iter()
        .filter_map(|term| {
            let initial = directional_scope(term, sentence)?;
            let span = clip_scope(initial, term.span, &closures);
            (!span.is_empty()).then_some(NegationScope {
                span,
                trigger: *term,
            })
        })
        .collect()
}

/// Scopes for a whole document.
///
/// Each match is attributed to the first sentence it overlaps; matches that
/// fall outside every sentence are dropped.
pub fn document_scopes(sentences: &[Span], matches: &[NegationMatch]) -> Vec<NegationScope> {
    group_by_sentence(sentences, matches.to_vec(), |m| m.span)
        .into_iter()
        .flat_map(|group| sentence_scopes(group.sentence, &group.items))
        .collect()
}

/// Overlap index over computed scopes
#[derive(Debug, Clone)]
pub struct NegationIndex {
    scopes: IntervalIndex<NegationScope>,
}

impl NegationIndex {
    /// Index a set of scopes
    pub fn new(scopes: impl IntoIterator<Item = NegationScope>) -> Self {
        Self {
            scopes: IntervalIndex::new(scopes.into_iter().map(|scope| (scope.span, scope))),
        }
    }

    /// Number of indexed scopes
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// True when nothing is negated
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// First scope (by start) overlapping `span`
    pub fn negating(&self, span: Span) -> Option<&NegationScope> {
        self.scopes.first_overlap(span).map(|(_, scope)| scope)
    }

    /// True when `span` overlaps any scope
    pub fn is_negated(&self, span: Span) -> bool {
        self.scopes.any_overlap(span)
    }

    /// Split `items` into `(kept, negated)`, pairing each negated item with
    /// the scope that negated it
    pub fn partition<T, F>(&self, items: Vec<T>, span_of: F) -> (Vec<T>, Vec<(T, NegationScope)>)
    where
        F: Fn(&T) -> Span,
    {
        let mut kept = Vec::with_capacity(items.len());
        let mut negated = Vec::new();
        for item in items {
            match self.negating(span_of(&item)) {
                Some(scope) => negated.push((item, *scope)),
                None => kept.push(item),
            }
        }
        (kept, negated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(start: usize, end: usize, kind: NegationKind) -> NegationMatch {
        NegationMatch::new(Span::new(start, end), kind)
    }

    #[test]
    fn test_directional_scopes() {
        let sentence = Span::new(10, 50);
        let term = Span::new(20, 25);
        assert_eq!(
            directional_scope(&m(20, 25, NegationKind::Forward), sentence),
            Some(Span::new(term.start, 50))
        );
        assert_eq!(
            directional_scope(&m(20, 25, NegationKind::Backward), sentence),
            Some(Span::new(10, term.end))
        );
        assert_eq!(directional_scope(&m(20, 25, NegationKind::Bidirectional), sentence), Some(sentence));
        assert_eq!(directional_scope(&m(20, 25, NegationKind::Closure), sentence), None);
    }

    #[test]
    fn test_closure_after_term_clips_end() {
        // "No chest pain, but severe headache."
        let sentence = Span::new(0, 35);
        let scopes = sentence_scopes(
            sentence,
            &[
                m(0, 2, NegationKind::Forward),
                m(13, 14, NegationKind::Closure),
                m(15, 18, NegationKind::Closure),
            ],
        );
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].span, Span::new(0, 14));
    }

    #[test]
    fn test_closure_before_term_clips_start() {
        let scopes = sentence_scopes(
            Span::new(0, 40),
            &[m(5, 6, NegationKind::Closure), m(20, 28, NegationKind::Backward)],
        );
        assert_eq!(scopes[0].span, Span::new(5, 28));
    }

    #[test]
    fn test_closure_outside_sentence_ignored() {
        let scopes = sentence_scopes(
            Span::new(0, 20),
            &[m(0, 2, NegationKind::Forward), m(25, 26, NegationKind::Closure)],
        );
        assert_eq!(scopes[0].span, Span::new(0, 20));
    }

    #[test]
    fn test_each_closure_moves_one_boundary() {
        // closure [8,12) starts before the term and ends after it, so only
        // the start moves
        let clipped = clip_scope(Span::new(0, 30), Span::new(10, 11), &[Span::new(8, 12)]);
        assert_eq!(clipped, Span::new(8, 30));
    }

    #[test]
    fn test_multiple_closures_narrow_monotonically() {
        let clipped = clip_scope(
            Span::new(0, 50),
            Span::new(20, 22),
            &[Span::new(30, 31), Span::new(25, 26), Span::new(40, 41)],
        );
        assert_eq!(clipped, Span::new(0, 26));
    }

    #[test]
    fn test_document_scopes_attribute_to_sentence() {
        let sentences = vec![Span::new(0, 10), Span::new(11, 30)];
        let scopes = document_scopes(
            &sentences,
            &[m(12, 14, NegationKind::Forward), m(40, 42, NegationKind::Forward)],
        );
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].span, Span::new(12, 30));
    }

    #[test]
    fn test_straddling_term_scoped_to_first_sentence() {
        let sentences = vec![Span::new(0, 10), Span::new(11, 20)];
        let scopes = document_scopes(&sentences, &[m(5, 15, NegationKind::Backward)]);
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].span, Span::new(0, 10));

        let sentence = Span::new(11, 20);
        assert_eq!(
            directional_scope(&m(5, 15, NegationKind::Forward), sentence),
            Some(Span::new(11, 20))
        );
    }

    #[test]
    fn test_partition_reports_first_scope() {
        let index = NegationIndex::new(vec![
            NegationScope {
                span: Span::new(0, 20),
                trigger: m(0, 2, NegationKind::Forward),
            },
            NegationScope {
                span: Span::new(5, 20),
                trigger: m(5, 7, NegationKind::Forward),
            },
        ]);
        let (kept, negated) = index.partition(vec![Span::new(10, 12), Span::new(25, 30)], |s| *s);

        assert_eq!(kept, vec![Span::new(25, 30)]);
        assert_eq!(negated.len(), 1);
        assert_eq!(negated[0].1.trigger.span, Span::new(0, 2));
    }
}
