use super::{keyword_score, neighbours, number_between, sentence_tokens, VitalKind, VitalSign, ACCEPT_SCORE};
use clinspan_core::{Span, Token};

/// Words suggesting a number is an oxygen saturation
pub const O2_KEYWORDS: &[&str] = &[
    "oxygen",
    "o2",
    "o2sat",
    "saturation",
    "oxygenate",
    "air",
    "saturating",
    "hypoxic",
    "hypoxia",
    "sat",
    "2",
    "l",
    "2lnc",
    "2l",
    "nc",
];

const WINDOW: usize = 4;

/// Oxygen saturation: numbers in (30, 101)
pub fn detect_o2(text: &str, tokens: &[Token], sentences: &[Span]) -> Vec<VitalSign> {
    let mut found = Vec::new();

    for sentence in sentences {
        let range = sentence_tokens(tokens, *sentence);
        let local = &tokens[range.clone()];
        for (index, token) in local.iter().enumerate() {
            let Some(value) = number_between(&token.lower, 30, 101) else {
                continue;
            };

            // context stays inside the sentence
            let mut words = neighbours(local, index, WINDOW, WINDOW);
            words.push(token.lower.as_str());
            let score = keyword_score(&words, O2_KEYWORDS, &[]);

            if score >= ACCEPT_SCORE {
                found.push(VitalSign {
                    kind: VitalKind::O2,
                    span: token.span,
                    text: text[token.span.start..token.span.end].to_string(),
                    value: value.to_string(),
                    score,
                });
            }
        }
    }

    found
}
