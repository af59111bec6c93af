//! Vital-sign detectors
//!
//! Each detector scores numeric tokens by the words around them and keeps
//! candidates scoring at least [`ACCEPT_SCORE`]. Accepted values are
//! summarized under their own category with concept id 0.

mod age;
mod bp;
mod o2;

pub use age::{detect_age, AGE_ANTI_KEYWORDS, AGE_KEYWORDS};
pub use bp::{detect_bp, BP_SEPARATORS};
pub use o2::{detect_o2, O2_KEYWORDS};

use clinspan_core::{group_by_sentence, ConceptId, Span, Summarize, Summary, Token};
use serde::Serialize;
use std::ops::Range;

/// Minimum plausibility for a candidate to be reported
pub const ACCEPT_SCORE: f64 = 1.0;

/// Concept id used for every vital sign
pub const VITAL_CONCEPT_ID: ConceptId = 0;

/// Kind of vital sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalKind {
    /// Patient age in years
    Age,
    /// Blood pressure, systolic over diastolic
    Bp,
    /// Oxygen saturation percentage
    O2,
}

impl VitalKind {
    /// Summary category
    pub fn category(&self) -> &'static str {
        match self {
            VitalKind::Age => "age",
            VitalKind::Bp => "bp",
            VitalKind::O2 => "o2",
        }
    }
}

/// An accepted vital-sign value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VitalSign {
    /// Kind of value
    pub kind: VitalKind,
    /// Location of the value
    pub span: Span,
    /// Text as it appears in the document
    pub text: String,
    /// Normalized value, e.g. `"54"` or `"120/80"`
    pub value: String,
    /// Plausibility score
    pub score: f64,
}

impl Summarize for VitalSign {
    fn category(&self) -> &str {
        self.kind.category()
    }

    fn label(&self) -> &str {
        &self.value
    }

    fn concept_id(&self) -> ConceptId {
        VITAL_CONCEPT_ID
    }

    fn token_spans(&self) -> Vec<Span> {
        vec![self.span]
    }
}

/// Accepted vital signs with their summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Vitals {
    /// Accepted values in document order
    pub signs: Vec<VitalSign>,
    /// Values grouped by category and sentence
    pub summary: Summary,
}

/// Run all three detectors. `conditions` are the token spans of resolved
/// conditions, which make nearby numbers less likely to be ages.
pub fn detect_vitals(text: &str, tokens: &[Token], sentences: &[Span], conditions: &[Span]) -> Vitals {
    let readings = detect_bp(text, tokens, sentences);
    // numbers inside an accepted blood pressure are not ages or saturations
    let mut signs: Vec<VitalSign> = detect_age(text, tokens, sentences, conditions)
        .into_iter()
        .chain(detect_o2(text, tokens, sentences))
        .filter(|sign| !readings.iter().any(|bp| bp.span.contains(&sign.span)))
        .collect();
    signs.extend(readings);
    signs.sort_by_key(|sign| sign.span);

    log::debug!("detected {} vital sign(s)", signs.len());
    let groups = group_by_sentence(sentences, signs.clone(), |sign| sign.span);
    Vitals {
        summary: Summary::from_groups(&groups),
        signs,
    }
}

/// Indices of the tokens lying inside `sentence`
pub(crate) fn sentence_tokens(tokens: &[Token], sentence: Span) -> Range<usize> {
    let start = tokens.partition_point(|t| t.span.start < sentence.start);
    let end = tokens.partition_point(|t| t.span.end <= sentence.end);
    start..end.max(start)
}

/// Number in a token when it is strictly between `lower` and `upper`.
///
/// The token is lowercased and every character outside `[a-z0-9., ]` is
/// blanked; the first remaining word must hold exactly one run of one to
/// three digits.
pub(crate) fn number_between(token: &str, lower: u32, upper: u32) -> Option<u32> {
    let cleaned: String = token
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == ',' {
                c
            } else {
                ' '
            }
        })
        .collect();
    let word = cleaned.split_whitespace().next()?;

    let first = word.find(|c: char| c.is_ascii_digit())?;
    let run = word[first..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(word.len() - first, |len| len);
    let rest = &word[first + run..];
    if run > 3 || rest.contains(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let value: u32 = word[first..first + run].parse().ok()?;
    (value > lower && value < upper).then_some(value)
}

/// Lowercase forms of up to `left` tokens before and `right` tokens after
/// token `index`
pub(crate) fn neighbours(tokens: &[Token], index: usize, left: usize, right: usize) -> Vec<&str> {
    let from = index.saturating_sub(left);
    let to = (index + 1 + right).min(tokens.len());
    tokens[from..index]
        .iter()
        .chain(&tokens[index + 1..to])
        .map(|t| t.lower.as_str())
        .collect()
}

/// `+1` per keyword and `-1` per anti-keyword among `words`
pub(crate) fn keyword_score(words: &[&str], keywords: &[&str], anti_keywords: &[&str]) -> f64 {
    words
        .iter()
        .map(|word| {
            let plus = keywords.iter().filter(|k| *k == word).count() as f64;
            let minus = anti_keywords.iter().filter(|k| *k == word).count() as f64;
            plus - minus
        })
        .sum()
}
