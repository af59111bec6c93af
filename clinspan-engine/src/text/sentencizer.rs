use clinspan_core::{Span, Token};

/// Tokens that close a sentence
pub const DEFAULT_DELIMITERS: &[&str] = &[".", ":", "!", ";"];

/// Groups tokens into ordered, non-overlapping sentence spans
pub trait Sentencizer: Send + Sync {
    /// Sentence spans, each running from its first token's start to its last
    /// token's end
    fn sentences(&self, text: &str, tokens: &[Token]) -> Vec<Span>;
}

/// Ends a sentence after a delimiter token, or before a token separated from
/// the previous one by a blank line
#[derive(Debug, Clone)]
pub struct DelimiterSentencizer {
    delimiters: Vec<String>,
}

impl Default for DelimiterSentencizer {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITERS.iter().copied())
    }
}

impl DelimiterSentencizer {
    /// Sentencizer with custom delimiter tokens
    pub fn new<I, S>(delimiters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            delimiters: delimiters.into_iter().map(Into::into).collect(),
        }
    }
}

fn is_blank_line(gap: &str) -> bool {
    gap.chars().filter(|&c| c == '\n').count() >= 2
}

impl Sentencizer for DelimiterSentencizer {
    fn sentences(&self, text: &str, tokens: &[Token]) -> Vec<Span> {
        let mut sentences = Vec::new();
        let Some(first) = tokens.first() else {
            return sentences;
        };

        let mut start = first.span.start;
        for (i, token) in tokens.iter().enumerate() {
            let Some(next) = tokens.get(i + 1) else {
                break;
            };
            let ends_here = self.delimiters.iter().any(|d| *d == token.lower)
                || text
                    .get(token.span.end..next.span.start)
                    .is_some_and(is_blank_line);
            if ends_here {
                sentences.push(Span::new(start, token.span.end));
                start = next.span.start;
            }
        }

        if let Some(last) = tokens.last() {
            sentences.push(Span::new(start, last.span.end));
        }
        sentences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{SimpleTokenizer, Tokenizer};

    fn split(text: &str) -> Vec<&str> {
        let tokens = SimpleTokenizer.tokenize(text);
        DelimiterSentencizer::default()
            .sentences(text, &tokens)
            .into_iter()
            .map(|s| &text[s.start..s.end])
            .collect()
    }

    #[test]
    fn test_delimiters_end_sentences() {
        assert_eq!(
            split("Assessment: no pain. Plan; rest!"),
            vec!["Assessment:", "no pain.", "Plan;", "rest!"]
        );
    }

    #[test]
    fn test_blank_line_ends_sentence() {
        assert_eq!(split("HPI\n\nchest pain\nworse"), vec!["HPI", "chest pain\nworse"]);
    }

    #[test]
    fn test_trailing_text_without_delimiter() {
        assert_eq!(split("no delimiter here"), vec!["no delimiter here"]);
    }

    #[test]
    fn test_no_tokens() {
        assert!(split("").is_empty());
    }
}
