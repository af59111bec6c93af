//! Reference phrase spotter and negation pattern tagger

mod negation;
mod phrase;

pub use negation::{NegationPatternSet, NegationTagger, TokenPattern, DEFAULT_MAX_GAP};
pub use phrase::PhraseSpotter;
