use super::{number_between, sentence_tokens, VitalKind, VitalSign, ACCEPT_SCORE};
use clinspan_core::{Span, Token};

/// Tokens joining systolic and diastolic values
pub const BP_SEPARATORS: &[&str] = &["/", "over"];

const BOUNDS: (u32, u32) = (30, 160);
const CONTEXT: usize = 3;

fn has_bp_context(preceding: &[Token]) -> bool {
    preceding.iter().any(|t| t.lower == "bp")
        || preceding
            .windows(2)
            .any(|pair| pair[0].lower == "blood" && pair[1].lower == "pressure")
}

/// Blood pressure readings: `number (/|over) number`, both in (30, 160)
pub fn detect_bp(text: &str, tokens: &[Token], sentences: &[Span]) -> Vec<VitalSign> {
    let mut found = Vec::new();

    for sentence in sentences {
        let range = sentence_tokens(tokens, *sentence);
        for index in range.clone() {
            if index + 2 >= range.end {
                break;
            }
            let Some(systolic) = number_between(&tokens[index].lower, BOUNDS.0, BOUNDS.1) else {
                continue;
            };
            if !BP_SEPARATORS.contains(&tokens[index + 1].lower.as_str()) {
                continue;
            }
            let Some(diastolic) = number_between(&tokens[index + 2].lower, BOUNDS.0, BOUNDS.1) else {
                continue;
            };

            // pair and separator
            let mut score = 2.0;
            if has_bp_context(&tokens[index.saturating_sub(CONTEXT)..index]) {
                score += 1.0;
            }
            score += if systolic > diastolic { 1.0 } else { -3.0 };

            if score >= ACCEPT_SCORE {
                let span = Span::new(tokens[index].span.start, tokens[index + 2].span.end);
                found.push(VitalSign {
                    kind: VitalKind::Bp,
                    span,
                    text: text[span.start..span.end].to_string(),
                    value: format!("{systolic}/{diastolic}"),
                    score,
                });
            }
        }
    }

    found
}
