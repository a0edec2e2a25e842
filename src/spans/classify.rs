use crate::range::TextRange;

use super::table::SpanTable;

/// Where an edit target sits relative to the mention spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    /// At or before the first span's start, or the table is empty.
    Leading,
    /// Inside span `i`.
    InsideSpan(usize),
    /// At or after span `i`'s end and at or before span `i + 1`'s start.
    BetweenSpans(usize, usize),
    /// At or after the last span's end.
    Trailing,
    /// A selection crossing the boundary of one or more spans. Holds the
    /// indices of every intersected span, ascending.
    Overlap(Vec<usize>),
}

impl Position {
    /// Index of the first span that an edit at this position leaves in
    /// place but moves.
    ///
    /// `None` for [`Position::Overlap`], whose surviving spans are found by
    /// offset after the intersected ones are removed.
    pub const fn first_shifted(&self, span_count: usize) -> Option<usize> {
        match self {
            Self::Leading => Some(0),
            Self::InsideSpan(i) | Self::BetweenSpans(i, _) => Some(*i + 1),
            Self::Trailing => Some(span_count),
            Self::Overlap(_) => None,
        }
    }

    /// Whether an edit here leaves every existing span intact.
    pub const fn is_outside_spans(&self) -> bool {
        matches!(self, Self::Leading | Self::BetweenSpans(..) | Self::Trailing)
    }
}

/// Classify a caret or a selection against `table`.
///
/// A caret is inside a span only when it lies strictly within the span's
/// interior; a caret on either boundary is outside, which lets the user type
/// directly next to a mention without touching it.
///
/// A non-empty range that intersects no span is classified by its start.
/// One that lies wholly within a single span's extent, boundaries included,
/// is [`Position::InsideSpan`]. Any other intersecting range escalates to
/// [`Position::Overlap`].
pub fn classify(table: &SpanTable, target: TextRange) -> Position {
    if target.is_empty() {
        return classify_offset(table, target.start());
    }

    let hits = table.spans_intersecting(target);
    match hits.as_slice() {
        [] => classify_offset(table, target.start()),
        [i] if table.get(*i).is_some_and(|span| span.range.encloses(target)) => {
            Position::InsideSpan(*i)
        }
        _ => Position::Overlap(hits),
    }
}

/// Classify a single caret offset.
pub fn classify_offset(table: &SpanTable, offset: usize) -> Position {
    let Some(first) = table.first() else {
        return Position::Leading;
    };
    if offset <= first.start() {
        return Position::Leading;
    }

    let spans = table.as_slice();
    for (i, span) in spans.iter().enumerate() {
        if span.range.has_interior(offset) {
            return Position::InsideSpan(i);
        }
        match spans.get(i + 1) {
            Some(next) if span.end() <= offset && offset <= next.start() => {
                return Position::BetweenSpans(i, i + 1);
            }
            Some(_) => {}
            None => break,
        }
    }
    Position::Trailing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spans::{MentionSpan, UserRef};

    fn table(ranges: &[(usize, usize)]) -> SpanTable {
        SpanTable::from_spans(ranges.iter().enumerate().map(|(i, &(s, e))| {
            MentionSpan::new(
                TextRange::new(s, e).unwrap(),
                UserRef::new(format!("u{i}"), format!("u{i}")),
            )
        }))
        .unwrap()
    }

    fn range(start: usize, end: usize) -> TextRange {
        TextRange::new(start, end).unwrap()
    }

    // --- Caret classification ---

    #[test]
    fn test_empty_table_is_leading() {
        let t = SpanTable::new();
        assert_eq!(classify_offset(&t, 0), Position::Leading);
        assert_eq!(classify_offset(&t, 42), Position::Leading);
    }

    #[test]
    fn test_caret_at_first_start_is_leading() {
        let t = table(&[(3, 6)]);
        assert_eq!(classify_offset(&t, 0), Position::Leading);
        assert_eq!(classify_offset(&t, 3), Position::Leading);
    }

    #[test]
    fn test_caret_in_interior_is_inside() {
        let t = table(&[(3, 6)]);
        assert_eq!(classify_offset(&t, 4), Position::InsideSpan(0));
        assert_eq!(classify_offset(&t, 5), Position::InsideSpan(0));
    }

    #[test]
    fn test_caret_at_last_end_is_trailing() {
        let t = table(&[(3, 6)]);
        assert_eq!(classify_offset(&t, 6), Position::Trailing);
        assert_eq!(classify_offset(&t, 20), Position::Trailing);
    }

    #[test]
    fn test_caret_between_spans() {
        let t = table(&[(0, 3), (6, 9), (12, 15)]);
        assert_eq!(classify_offset(&t, 3), Position::BetweenSpans(0, 1));
        assert_eq!(classify_offset(&t, 6), Position::BetweenSpans(0, 1));
        assert_eq!(classify_offset(&t, 10), Position::BetweenSpans(1, 2));
        assert_eq!(classify_offset(&t, 13), Position::InsideSpan(2));
        assert_eq!(classify_offset(&t, 15), Position::Trailing);
    }

    #[test]
    fn test_caret_between_touching_spans() {
        let t = table(&[(0, 3), (3, 6)]);
        assert_eq!(classify_offset(&t, 3), Position::BetweenSpans(0, 1));
    }

    // --- Range classification ---

    #[test]
    fn test_range_clear_of_spans_uses_start() {
        let t = table(&[(3, 6), (10, 12)]);
        assert_eq!(classify(&t, range(0, 3)), Position::Leading);
        assert_eq!(classify(&t, range(6, 10)), Position::BetweenSpans(0, 1));
        assert_eq!(classify(&t, range(12, 14)), Position::Trailing);
    }

    #[test]
    fn test_range_within_span_is_inside() {
        let t = table(&[(3, 6)]);
        assert_eq!(classify(&t, range(5, 6)), Position::InsideSpan(0));
        assert_eq!(classify(&t, range(3, 6)), Position::InsideSpan(0));
        assert_eq!(classify(&t, range(4, 5)), Position::InsideSpan(0));
    }

    #[test]
    fn test_range_crossing_boundary_overlaps() {
        let t = table(&[(3, 6), (10, 12)]);
        assert_eq!(classify(&t, range(2, 4)), Position::Overlap(vec![0]));
        assert_eq!(classify(&t, range(5, 11)), Position::Overlap(vec![0, 1]));
        assert_eq!(classify(&t, range(0, 20)), Position::Overlap(vec![0, 1]));
    }

    #[test]
    fn test_first_shifted() {
        assert_eq!(Position::Leading.first_shifted(3), Some(0));
        assert_eq!(Position::BetweenSpans(1, 2).first_shifted(3), Some(2));
        assert_eq!(Position::InsideSpan(0).first_shifted(3), Some(1));
        assert_eq!(Position::Trailing.first_shifted(3), Some(3));
        assert_eq!(Position::Overlap(vec![0]).first_shifted(3), None);
    }
}
