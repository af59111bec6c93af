//! Static interval index for overlap queries
//!
//! Built once per invocation from a fixed set of spans and queried with
//! half-open overlap semantics. Empty intervals are never stored.

use crate::types::Span;

/// Immutable index of `(Span, T)` entries sorted by start offset
#[derive(Debug, Clone)]
pub struct IntervalIndex<T> {
    entries: Vec<(Span, T)>,
    /// `max_end[i]` is the largest end among `entries[..=i]`
    max_end: Vec<usize>,
}

impl<T> IntervalIndex<T> {
    /// Build an index; empty spans are dropped
    pub fn new(items: impl IntoIterator<Item = (Span, T)>) -> Self {
        let mut entries: Vec<(Span, T)> = items.into_iter().filter(|(s, _)| !s.is_empty()).collect();
        entries.sort_by_key(|(s, _)| (s.start, s.end));

        let mut max_end = Vec::with_capacity(entries.len());
        let mut running = 0;
        for (span, _) in &entries {
            running = running.max(span.end);
            max_end.push(running);
        }

        Self { entries, max_end }
    }

    /// Number of stored intervals
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries overlapping `query`, ordered by (start, end)
    pub fn overlapping(&self, query: Span) -> impl Iterator<Item = (&Span, &T)> + '_ {
        // entries starting at or after query.end can never overlap
        let upper = if query.is_empty() {
            0
        } else {
            self.entries.partition_point(|(s, _)| s.start < query.end)
        };
        // skip the prefix whose running max end cannot reach query.start
        let lower = self.max_end[..upper].partition_point(|&end| end <= query.start);

        self.entries[lower..upper]
            .iter()
            .filter(move |(s, _)| s.end > query.start)
            .map(|(s, v)| (s, v))
    }

    /// First overlapping entry by (start, end)
    pub fn first_overlap(&self, query: Span) -> Option<(&Span, &T)> {
        self.overlapping(query).next()
    }

    /// True when any stored interval overlaps `query`
    pub fn any_overlap(&self, query: Span) -> bool {
        self.first_overlap(query).is_some()
    }
}
