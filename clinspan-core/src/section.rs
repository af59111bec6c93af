//! Section boundary resolution
//!
//! Header patterns are searched at line starts (or the document start) and
//! must be followed by `:` or a newline. Overlapping header hits are merged,
//! then the surviving headers partition the document into typed sections.

use crate::error::{CoreError, Result};
use crate::types::{SectionSpan, Span};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

/// A header occurrence found in the text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpan {
    /// Region the header occupies
    pub span: Span,
    /// Header text used for type lookup
    pub text: String,
}

impl HeaderSpan {
    /// Create a header span
    pub fn new(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            span: Span::new(start, end),
            text: text.into(),
        }
    }
}

/// Raw header pattern to normalized section type mapping, with the compiled
/// search expressions
#[derive(Debug, Clone)]
pub struct SectionHeaderMap {
    /// Lowercased raw header -> normalized type
    types: HashMap<String, String>,
    expressions: Vec<Regex>,
}

impl SectionHeaderMap {
    /// Compile a header map from `(normalized_type, raw_header_pattern)` pairs.
    ///
    /// The raw pattern is used as a regular-expression fragment; lookups of
    /// matched header text compare against the lowercased raw pattern.
    pub fn new<I, S, P>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: AsRef<str>,
    {
        let mut types = HashMap::new();
        let mut expressions = Vec::new();

        for (kind, pattern) in entries {
            let pattern = pattern.as_ref();
            let source = format!(r"(?:^|\n)(?P<section>{pattern})(?::|\n)");
            let expression = RegexBuilder::new(&source)
                .case_insensitive(true)
                .build()
                .map_err(|e| CoreError::InvalidHeaderPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;

            types.insert(pattern.to_lowercase(), kind.into());
            expressions.push(expression);
        }

        Ok(Self { types, expressions })
    }

    /// An empty map: every document is one untyped section
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
            expressions: Vec::new(),
        }
    }

    /// Number of registered headers
    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    /// True when no headers are registered
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Normalized type for a header's text, compared case-insensitively
    pub fn section_type(&self, header_text: &str) -> Option<&str> {
        self.types.get(&header_text.to_lowercase()).map(String::as_str)
    }

    /// Raw header hits, in pattern order then text order
    pub fn find_headers(&self, text: &str) -> Vec<HeaderSpan> {
        let mut headers = Vec::new();
        for expression in &self.expressions {
            for captures in expression.captures_iter(text) {
                if let Some(section) = captures.name("section") {
                    headers.push(HeaderSpan::new(section.start(), section.end(), section.as_str()));
                }
            }
        }
        headers
    }

    /// Resolve the document into contiguous sections
    pub fn resolve(&self, text: &str) -> Vec<SectionSpan> {
        let headers = merge_overlapping(self.find_headers(text));
        build_sections(&headers, text.len(), |header| {
            self.section_type(header).map(str::to_string)
        })
    }
}

/// Merge overlapping header spans, returning them sorted by start.
///
/// - no overlap with the last kept span: keep
/// - same start, extends further: replace the last kept span
/// - partial overlap: replace with `[start, last.end)` carrying the text of
///   the longer of the two original spans (the current one on ties)
/// - otherwise contained: drop
pub fn merge_overlapping(mut spans: Vec<HeaderSpan>) -> Vec<HeaderSpan> {
    spans.sort_by_key(|h| h.span.start);

    let mut output: Vec<HeaderSpan> = Vec::with_capacity(spans.len());
    for current in spans {
        let Some(last) = output.last_mut() else {
            output.push(current);
            continue;
        };

        let (start, end) = (current.span.start, current.span.end);
        if start >= last.span.end {
            output.push(current);
        } else if start == last.span.start && end > last.span.end {
            *last = current;
        } else if end > last.span.end {
            let text = if current.span.len() >= last.span.len() {
                current.text
            } else {
                std::mem::take(&mut last.text)
            };
            *last = HeaderSpan::new(start, last.span.end, text);
        }
    }

    output
}

/// Partition `[0, len)` at each header start.
///
/// Text before the first header becomes an untyped section; a document
/// without headers is one untyped section.
pub fn build_sections<F>(headers: &[HeaderSpan], len: usize, mut lookup: F) -> Vec<SectionSpan>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut sections = Vec::with_capacity(headers.len() + 1);
    let first_start = headers.first().map_or(len, |h| h.span.start);

    if first_start > 0 {
        sections.push(SectionSpan {
            span: Span::new(0, first_start),
            kind: None,
        });
    }

    for (i, header) in headers.iter().enumerate() {
        let end = headers.get(i + 1).map_or(len, |next| next.span.start);
        sections.push(SectionSpan {
            span: Span::new(header.span.start, end),
            kind: lookup(&header.text),
        });
    }

    sections
}
