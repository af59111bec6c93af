use crate::text::Tokenizer;
use clinspan_core::{PhraseHit, Span, Token};
use std::collections::HashMap;

/// Case-insensitive dictionary matcher over token sequences
///
/// Phrases are tokenized with the same tokenizer as documents, so a phrase
/// only matches on token boundaries. Every match is reported, overlapping
/// ones included.
#[derive(Debug, Clone, Default)]
pub struct PhraseSpotter {
    /// First token -> full token sequences starting with it
    by_first: HashMap<String, Vec<Vec<String>>>,
    len: usize,
}

impl PhraseSpotter {
    /// Compile phrases with `tokenizer`; blank phrases are ignored
    pub fn new<I, S>(phrases: I, tokenizer: &dyn Tokenizer) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut spotter = Self::default();
        for phrase in phrases {
            let phrase = phrase.as_ref();
            let sequence: Vec<String> = tokenizer.tokenize(phrase).into_iter().map(|t| t.lower).collect();
            let Some(first) = sequence.first().cloned() else {
                continue;
            };
            let candidates = spotter.by_first.entry(first).or_default();
            if !candidates.contains(&sequence) {
                candidates.push(sequence);
                spotter.len += 1;
            }
        }
        for candidates in spotter.by_first.values_mut() {
            candidates.sort_by_key(Vec::len);
        }
        spotter
    }

    /// Number of distinct phrases
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no phrases are compiled
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All matches in `tokens`, ordered by start then length
    pub fn find(&self, text: &str, tokens: &[Token]) -> Vec<PhraseHit> {
        let mut hits = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            let Some(candidates) = self.by_first.get(&token.lower) else {
                continue;
            };
            for sequence in candidates {
                let Some(window) = tokens.get(i..i + sequence.len()) else {
                    continue;
                };
                if window.iter().zip(sequence).all(|(t, s)| t.lower == *s) {
                    let span = Span::new(token.span.start, window[window.len() - 1].span.end);
                    if let Some(matched) = span.slice(text) {
                        hits.push(PhraseHit::new(span, matched));
                    }
                }
            }
        }
        hits
    }
}
