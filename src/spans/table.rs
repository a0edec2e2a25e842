use crate::error::SpanError;
use crate::range::TextRange;

use super::types::MentionSpan;

/// Ordered, non-overlapping mention spans over a text buffer.
///
/// Spans are kept sorted by `start`, and for every neighbouring pair
/// `spans[i].end <= spans[i + 1].start`. Adjacent spans may share a
/// boundary; they never share an interior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanTable {
    spans: Vec<MentionSpan>,
}

impl SpanTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from spans in any order, rejecting overlaps.
    pub fn from_spans(spans: impl IntoIterator<Item = MentionSpan>) -> Result<Self, SpanError> {
        let mut table = Self::new();
        for span in spans {
            table.insert(span)?;
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MentionSpan> {
        self.spans.get(index)
    }

    pub fn first(&self) -> Option<&MentionSpan> {
        self.spans.first()
    }

    pub fn last(&self) -> Option<&MentionSpan> {
        self.spans.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MentionSpan> {
        self.spans.iter()
    }

    pub fn as_slice(&self) -> &[MentionSpan] {
        &self.spans
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    /// Insert `span` at its sorted position and return that index.
    ///
    /// Fails with [`SpanError::EmptySpan`] for a zero-length range and with
    /// [`SpanError::Overlap`] when the span would intersect a neighbour.
    pub fn insert(&mut self, span: MentionSpan) -> Result<usize, SpanError> {
        if span.range.is_empty() {
            return Err(SpanError::EmptySpan(span.range));
        }
        let index = self.spans.partition_point(|s| s.start() < span.start());
        if let Some(prev) = index.checked_sub(1).and_then(|i| self.spans.get(i))
            && prev.end() > span.start()
        {
            return Err(SpanError::Overlap {
                new: span.range,
                existing: prev.range,
            });
        }
        if let Some(next) = self.spans.get(index)
            && span.end() > next.start()
        {
            return Err(SpanError::Overlap {
                new: span.range,
                existing: next.range,
            });
        }
        self.spans.insert(index, span);
        Ok(index)
    }

    /// Remove and return the span at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<MentionSpan, SpanError> {
        if index >= self.spans.len() {
            return Err(SpanError::Index {
                index,
                len: self.spans.len(),
            });
        }
        Ok(self.spans.remove(index))
    }

    /// Indices, ascending, of every span intersecting `range`.
    ///
    /// A span intersects when its interior overlaps `range` or one of its
    /// boundaries lies strictly inside `range`. Touching at an endpoint is
    /// not an intersection, so text typed right next to a mention leaves it
    /// alone.
    pub fn spans_intersecting(&self, range: TextRange) -> Vec<usize> {
        self.spans
            .iter()
            .enumerate()
            .filter(|(_, span)| span.range.intersects(range))
            .map(|(i, _)| i)
            .collect()
    }

    /// Index of the span starting exactly at `offset`.
    pub fn span_starting_at(&self, offset: usize) -> Option<usize> {
        self.spans.iter().position(|span| span.start() == offset)
    }

    /// Whether any span refers to `account`.
    pub fn contains_account(&self, account: &str) -> bool {
        self.spans.iter().any(|span| span.user.account == account)
    }

    /// Shift every span from index `first` onward by `delta`.
    pub(crate) fn shift_from(&mut self, first: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        for span in self.spans.iter_mut().skip(first) {
            let shifted = span.range.shifted(delta);
            tracing::trace!(from = %span.range, to = %shifted, "shift span");
            span.range = shifted;
        }
    }

    /// Check ordering, overlap, emptiness and bounds against `text_len`.
    pub fn check_invariants(&self, text_len: usize) -> Result<(), String> {
        for (i, span) in self.spans.iter().enumerate() {
            if span.range.is_empty() {
                return Err(format!("span {i} {} is empty", span.range));
            }
            if span.end() > text_len {
                return Err(format!(
                    "span {i} {} exceeds text length {text_len}",
                    span.range
                ));
            }
            if let Some(next) = self.spans.get(i + 1)
                && span.end() > next.start()
            {
                return Err(format!(
                    "span {i} {} overlaps span {} {}",
                    span.range,
                    i + 1,
                    next.range
                ));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SpanTable {
    type Item = &'a MentionSpan;
    type IntoIter = std::slice::Iter<'a, MentionSpan>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}
