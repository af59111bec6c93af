//! Reference tokenizer and sentencizer
//!
//! Both are intentionally small; anything implementing the traits can be
//! plugged into the annotator instead.

mod sentencizer;
mod tokenizer;

pub use sentencizer::{DelimiterSentencizer, Sentencizer, DEFAULT_DELIMITERS};
pub use tokenizer::{SimpleTokenizer, Tokenizer};
