use clinspan_core::{Span, Token};

/// Splits text into tokens with byte offsets
pub trait Tokenizer: Send + Sync {
    /// Tokens in document order
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Whitespace tokenizer that isolates every ASCII punctuation character
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTokenizer;

impl SimpleTokenizer {
    /// Create a tokenizer
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut word_start: Option<usize> = None;

        for (i, ch) in text.char_indices() {
            if ch.is_whitespace() || ch.is_ascii_punctuation() {
                if let Some(start) = word_start.take() {
                    tokens.push(Token::new(Span::new(start, i), &text[start..i]));
                }
                if ch.is_ascii_punctuation() {
                    tokens.push(Token::new(Span::new(i, i + 1), &text[i..i + 1]));
                }
            } else if word_start.is_none() {
                word_start = Some(i);
            }
        }
        if let Some(start) = word_start {
            tokens.push(Token::new(Span::new(start, text.len()), &text[start..]));
        }

        tokens
    }
}
