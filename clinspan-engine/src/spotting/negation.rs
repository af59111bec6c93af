use crate::error::{EngineError, Result};
use clinspan_core::{NegationKind, NegationMatch, Span, Token};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

/// Gap allowed by `*` when the pattern file does not say otherwise
pub const DEFAULT_MAX_GAP: usize = 4;

static BUILTIN: OnceLock<std::result::Result<NegationPatternSet, String>> = OnceLock::new();

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PatternFile {
    #[serde(default = "default_max_gap")]
    max_gap: usize,
    #[serde(default)]
    forward: Vec<String>,
    #[serde(default)]
    backward: Vec<String>,
    #[serde(default)]
    bidirectional: Vec<String>,
    #[serde(default)]
    closure: Vec<String>,
}

fn default_max_gap() -> usize {
    DEFAULT_MAX_GAP
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Element {
    /// One token equal to any alternative
    Word(Vec<String>),
    /// Up to `max_gap` arbitrary tokens
    Gap,
}

/// One compiled negation pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPattern {
    kind: NegationKind,
    source: String,
    elements: Vec<Element>,
}

impl TokenPattern {
    /// Compile a pattern such as `"without|no * evidence of"`
    pub fn parse(kind: NegationKind, source: &str) -> Result<Self> {
        let invalid = |reason: &str| EngineError::InvalidPattern {
            pattern: source.to_string(),
            reason: reason.to_string(),
        };

        let mut elements = Vec::new();
        for part in source.split_whitespace() {
            if part == "*" {
                elements.push(Element::Gap);
                continue;
            }
            let alternatives: Vec<String> = part.split('|').map(str::to_lowercase).collect();
            if alternatives.iter().any(String::is_empty) {
                return Err(invalid("empty alternative"));
            }
            elements.push(Element::Word(alternatives));
        }

        match (elements.first(), elements.last()) {
            (None, _) => Err(invalid("empty pattern")),
            (Some(Element::Gap), _) | (_, Some(Element::Gap)) => Err(invalid("pattern cannot start or end with '*'")),
            _ => Ok(Self {
                kind,
                source: source.to_string(),
                elements,
            }),
        }
    }

    /// Pattern category
    pub fn kind(&self) -> NegationKind {
        self.kind
    }

    /// Pattern text as written
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Exclusive end indices of every match starting at token `start`
    fn match_ends(&self, tokens: &[Token], start: usize, max_gap: usize) -> Vec<usize> {
        let mut ends = Vec::new();
        walk(&self.elements, tokens, start, max_gap, &mut ends);
        ends
    }
}

fn walk(elements: &[Element], tokens: &[Token], at: usize, max_gap: usize, ends: &mut Vec<usize>) {
    let Some((first, rest)) = elements.split_first() else {
        ends.push(at);
        return;
    };
    match first {
        Element::Word(alternatives) => {
            if let Some(token) = tokens.get(at) {
                if alternatives.contains(&token.lower) {
                    walk(rest, tokens, at + 1, max_gap, ends);
                }
            }
        }
        Element::Gap => {
            for skip in 0..=max_gap {
                if at + skip > tokens.len() {
                    break;
                }
                walk(rest, tokens, at + skip, max_gap, ends);
            }
        }
    }
}

/// Compiled negation patterns of all four categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegationPatternSet {
    max_gap: usize,
    patterns: Vec<TokenPattern>,
}

impl NegationPatternSet {
    /// Parse a pattern table
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self> {
        let file: PatternFile = toml::from_str(content).map_err(|e| EngineError::Toml {
            path: origin.to_string(),
            message: e.to_string(),
        })?;

        let mut patterns = Vec::new();
        for (kind, sources) in [
            (NegationKind::Forward, &file.forward),
            (NegationKind::Backward, &file.backward),
            (NegationKind::Bidirectional, &file.bidirectional),
            (NegationKind::Closure, &file.closure),
        ] {
            for source in sources {
                patterns.push(TokenPattern::parse(kind, source)?);
            }
        }

        Ok(Self {
            max_gap: file.max_gap,
            patterns,
        })
    }

    /// Load a pattern table from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// The embedded default table
    pub fn builtin() -> Result<Self> {
        BUILTIN
            .get_or_init(|| {
                Self::from_toml_str(include_str!("../../configs/negation.toml"), "<embedded>")
                    .map_err(|e| e.to_string())
            })
            .clone()
            .map_err(|message| EngineError::Toml {
                path: "<embedded>".to_string(),
                message,
            })
    }

    /// Total number of patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when no patterns are defined
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns of one category
    pub fn of_kind(&self, kind: NegationKind) -> impl Iterator<Item = &TokenPattern> {
        self.patterns.iter().filter(move |p| p.kind == kind)
    }

    /// Maximum tokens a `*` may skip
    pub fn max_gap(&self) -> usize {
        self.max_gap
    }
}

/// Runs a [`NegationPatternSet`] over a token stream
#[derive(Debug, Clone)]
pub struct NegationTagger {
    patterns: NegationPatternSet,
}

impl NegationTagger {
    /// Create a tagger
    pub fn new(patterns: NegationPatternSet) -> Self {
        Self { patterns }
    }

    /// Patterns in use
    pub fn patterns(&self) -> &NegationPatternSet {
        &self.patterns
    }

    /// Every distinct match, ordered by start token then pattern order
    pub fn find(&self, tokens: &[Token]) -> Vec<NegationMatch> {
        let mut seen = HashSet::new();
        let mut matches = Vec::new();

        for start in 0..tokens.len() {
            for pattern in &self.patterns.patterns {
                for end in pattern.match_ends(tokens, start, self.patterns.max_gap) {
                    let span = Span::new(tokens[start].span.start, tokens[end - 1].span.end);
                    let found = NegationMatch::new(span, pattern.kind);
                    if seen.insert(found) {
                        matches.push(found);
                    }
                }
            }
        }

        matches
    }
}
