use super::{keyword_score, neighbours, number_between, sentence_tokens, VitalKind, VitalSign, ACCEPT_SCORE};
use clinspan_core::{Span, Token};

/// Words suggesting a number is an age
pub const AGE_KEYWORDS: &[&str] = &[
    "age", "year", "years", "old", "yo", "patient", "pt", "y.o.", "y.", "o.", "y/o", "y", "m", "f",
];

/// Words suggesting a number is something else
pub const AGE_ANTI_KEYWORDS: &[&str] = &[
    "at", "last", "ago", "since", "g", "mg", "mcg", "beats", "rate", "for", "smokes", "history", "ml", "has",
];

const WINDOW: usize = 2;

/// Ages: numbers in (2, 125)
pub fn detect_age(text: &str, tokens: &[Token], sentences: &[Span], conditions: &[Span]) -> Vec<VitalSign> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();

    for sentence in sentences {
        for index in sentence_tokens(tokens, *sentence) {
            let token = &tokens[index];
            let Some(age) = number_between(&token.lower, 2, 125) else {
                continue;
            };

            let mut words = neighbours(tokens, index, WINDOW, WINDOW);
            words.push(token.lower.as_str());
            let mut score = keyword_score(&words, AGE_KEYWORDS, AGE_ANTI_KEYWORDS);

            // a condition right next to the number is likely its duration
            let window = Span::new(
                tokens[index.saturating_sub(WINDOW)].span.start,
                tokens[(index + WINDOW).min(tokens.len() - 1)].span.end,
            );
            score -= 2.0 * conditions.iter().filter(|c| window.contains(c)).count() as f64;

            let (start, end) = (token.span.start, token.span.end);
            let dot_before = start >= 1 && bytes[start - 1] == b'.';
            let dot_after = end < bytes.len() && bytes[end] == b'.';
            if dot_before {
                score -= 1.0;
                if start >= 2 && bytes[start - 2].is_ascii_digit() {
                    score -= 10.0;
                }
            }
            if dot_after {
                score -= 1.0;
                if end + 1 < bytes.len() && bytes[end + 1].is_ascii_digit() {
                    score -= 10.0;
                }
            }

            if (9..=95).contains(&age) {
                score += 0.5;
            }

            if score >= ACCEPT_SCORE {
                found.push(VitalSign {
                    kind: VitalKind::Age,
                    span: token.span,
                    text: text[start..end].to_string(),
                    value: age.to_string(),
                    score,
                });
            }
        }
    }

    found
}
