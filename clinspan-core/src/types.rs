//! Shared data model: spans, tokens, documents and raw hits
//!
//! All offsets are half-open byte offsets into the document's UTF-8 text.

use crate::error::{CoreError, Result};

/// Stable identifier of a normalized clinical concept
pub type ConceptId = i64;

/// Half-open byte interval `[start, end)` into a document's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Inclusive start offset
    pub start: usize,
    /// Exclusive end offset
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when the span covers nothing
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Half-open overlap test; empty spans overlap nothing
    pub fn overlaps(&self, other: &Span) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// True when `other` lies entirely within this span
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Slice the span out of `text`, or `None` when it is not on char boundaries
    pub fn slice<'t>(&self, text: &'t str) -> Option<&'t str> {
        text.get(self.start..self.end)
    }
}

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Span::new(start, end)
    }
}

/// One token of the document
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    /// Location in the text
    pub span: Span,
    /// Lowercase surface form
    pub lower: String,
    /// Lemma form
    pub lemma: String,
}

impl Token {
    /// Create a token whose lemma equals its lowercase form
    pub fn new(span: Span, text: &str) -> Self {
        let lower = text.to_lowercase();
        Self {
            span,
            lemma: lower.clone(),
            lower,
        }
    }
}

/// Immutable text plus its derived token and sentence boundaries
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    tokens: Vec<Token>,
    sentences: Vec<Span>,
}

impl Document {
    /// Build a document, checking that every span fits the text and that
    /// sentences are ordered and non-overlapping
    pub fn new(text: impl Into<String>, tokens: Vec<Token>, sentences: Vec<Span>) -> Result<Self> {
        let text = text.into();
        let len = text.len();

        for span in tokens.iter().map(|t| &t.span).chain(sentences.iter()) {
            if span.start > span.end || span.end > len {
                return Err(CoreError::InvalidSpan {
                    start: span.start,
                    end: span.end,
                    len,
                });
            }
        }

        for (index, pair) in sentences.windows(2).enumerate() {
            if pair[1].start < pair[0].end {
                return Err(CoreError::UnorderedSentences {
                    index: index + 1,
                    start: pair[1].start,
                    end: pair[1].end,
                });
            }
        }

        Ok(Self {
            text,
            tokens,
            sentences,
        })
    }

    /// The full text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Tokens in document order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Sentence spans in document order
    pub fn sentences(&self) -> &[Span] {
        &self.sentences
    }

    /// Text length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True for an empty document
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// First sentence (by start) overlapping `span`
    pub fn sentence_of(&self, span: Span) -> Option<Span> {
        // sentences are sorted and disjoint, so the first candidate is the
        // first sentence whose end lies past the span start
        let from = self.sentences.partition_point(|s| s.end <= span.start);
        self.sentences[from..]
            .iter()
            .take_while(|s| s.start < span.end)
            .find(|s| s.overlaps(&span))
            .copied()
    }
}

/// A literal phrase match returned by phrase spotting
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhraseHit {
    /// Location of the match
    pub span: Span,
    /// Matched text as it appears in the document
    pub text: String,
}

impl PhraseHit {
    /// Create a phrase hit
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }

    /// Normalized lookup key
    pub fn key(&self) -> String {
        self.text.to_lowercase()
    }
}

/// Direction class of a negation pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NegationKind {
    /// Negates from the term to the sentence end
    Forward,
    /// Negates from the sentence start to the term
    Backward,
    /// Negates the whole sentence
    Bidirectional,
    /// Bounds other scopes without negating
    Closure,
}

impl NegationKind {
    /// All kinds, closure last
    pub const ALL: [NegationKind; 4] = [
        NegationKind::Forward,
        NegationKind::Backward,
        NegationKind::Bidirectional,
        NegationKind::Closure,
    ];

    /// Short tag name
    pub fn tag(&self) -> &'static str {
        match self {
            NegationKind::Forward => "forward",
            NegationKind::Backward => "backward",
            NegationKind::Bidirectional => "bidirectional",
            NegationKind::Closure => "closure",
        }
    }
}

/// A raw negation-pattern hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NegationMatch {
    /// Location of the matched tokens
    pub span: Span,
    /// Pattern category
    pub kind: NegationKind,
}

impl NegationMatch {
    /// Create a negation match
    pub fn new(span: Span, kind: NegationKind) -> Self {
        Self { span, kind }
    }
}

/// A labeled region of the document
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectionSpan {
    /// Region covered
    pub span: Span,
    /// Normalized section type, absent for untyped regions
    pub kind: Option<String>,
}

/// Items attributed to one sentence
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SentenceGroup<T> {
    /// Sentence boundary
    pub sentence: Span,
    /// Items found in the sentence
    pub items: Vec<T>,
}

impl<T> SentenceGroup<T> {
    /// Create a group
    pub fn new(sentence: Span, items: Vec<T>) -> Self {
        Self { sentence, items }
    }
}

/// Group `items` by the first sentence each overlaps, preserving sentence
/// order and item order. Items outside every sentence are dropped; sentences
/// without items are omitted.
pub fn group_by_sentence<T, F>(sentences: &[Span], items: Vec<T>, span_of: F) -> Vec<SentenceGroup<T>>
where
    F: Fn(&T) -> Span,
{
    let index = crate::interval::IntervalIndex::new(sentences.iter().enumerate().map(|(i, s)| (*s, i)));
    let mut buckets: Vec<Vec<T>> = std::iter::repeat_with(Vec::new).take(sentences.len()).collect();

    for item in items {
        let span = span_of(&item);
        match index.first_overlap(span) {
            Some((_, &i)) => buckets[i].push(item),
            None => log::trace!("item at {}..{} outside every sentence, dropped", span.start, span.end),
        }
    }

    sentences
        .iter()
        .zip(buckets)
        .filter(|(_, items)| !items.is_empty())
        .map(|(sentence, items)| SentenceGroup::new(*sentence, items))
        .collect()
}
