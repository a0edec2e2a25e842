use crate::error::SpanError;
use crate::range::{TextRange, edit_delta};

use super::classify::Position;
use super::table::SpanTable;
use super::types::{CandidateCache, MentionSpan, UserRef};

/// What an accepted edit did to the span table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rebase {
    /// The text range the edit really consumes. Wider than the requested
    /// range when the edit landed inside a mention.
    pub consumed: TextRange,
    /// Change in text length, in characters.
    pub delta: isize,
    /// Spans removed by the edit, in ascending order.
    pub removed: Vec<MentionSpan>,
}

/// Rebase `table` for replacing `consumed` with `replacement`.
///
/// `position` must be the classification of `consumed` against `table`.
/// Mentions are atomic: an edit inside one widens to the whole mention and
/// removes it, and a selection crossing mention boundaries removes every
/// mention it touches. Remaining spans after the edit move by the length
/// delta. Users of removed spans leave `candidates` once no span refers to
/// them any more.
pub fn rebase(
    table: &mut SpanTable,
    candidates: &mut CandidateCache,
    position: &Position,
    consumed: TextRange,
    replacement: &str,
) -> Rebase {
    let mut removed = Vec::new();
    let consumed = match position {
        Position::InsideSpan(i) => match table.remove_at(*i) {
            Ok(span) => {
                let widened = span.range;
                removed.push(span);
                widened
            }
            Err(err) => {
                tracing::debug!(%err, "inside-span rebase without a span");
                consumed
            }
        },
        Position::Overlap(indices) => {
            for &i in indices.iter().rev() {
                if let Ok(span) = table.remove_at(i) {
                    removed.push(span);
                }
            }
            removed.reverse();
            consumed
        }
        Position::Leading | Position::BetweenSpans(..) | Position::Trailing => consumed,
    };

    let delta = edit_delta(consumed, replacement);
    let first = match position {
        Position::InsideSpan(i) => *i,
        Position::Overlap(_) => first_at_or_after(table, consumed.end()),
        other => other.first_shifted(table.len()).unwrap_or(table.len()),
    };
    table.shift_from(first, delta);

    for span in &removed {
        release_candidate(table, candidates, &span.user);
    }
    tracing::debug!(
        ?position,
        %consumed,
        delta,
        removed = removed.len(),
        "rebased spans"
    );

    Rebase {
        consumed,
        delta,
        removed,
    }
}

/// Shift spans for a confirmed mention and insert its span.
///
/// `pending` is the range being replaced (the typed `@` prefix),
/// `inserted_len` the character length of the text replacing it and
/// `span_len` the length of that text covered by the new span. Returns
/// `Ok(None)` without touching the table when `position` is inside or
/// across an existing mention.
pub fn insert_mention(
    table: &mut SpanTable,
    candidates: &mut CandidateCache,
    position: &Position,
    pending: TextRange,
    inserted: &str,
    span_len: usize,
    user: &UserRef,
) -> Result<Option<MentionSpan>, SpanError> {
    let Some(first) = position
        .is_outside_spans()
        .then(|| position.first_shifted(table.len()))
        .flatten()
    else {
        tracing::debug!(?position, %pending, "mention confirmation ignored");
        return Ok(None);
    };

    let span = MentionSpan::new(TextRange::with_len(pending.start(), span_len), user.clone());
    table.shift_from(first, edit_delta(pending, inserted));
    table.insert(span.clone())?;
    candidates.add(user);
    Ok(Some(span))
}

/// Drop `user` from `candidates` unless another span still mentions it.
pub(crate) fn release_candidate(table: &SpanTable, candidates: &mut CandidateCache, user: &UserRef) {
    if !table.contains_account(&user.account) {
        candidates.remove(&user.account);
    }
}

fn first_at_or_after(table: &SpanTable, offset: usize) -> usize {
    table.as_slice().partition_point(|span| span.start() < offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spans::classify;

    fn user(account: &str) -> UserRef {
        UserRef::new(account, account)
    }

    fn table(ranges: &[(usize, usize, &str)]) -> SpanTable {
        SpanTable::from_spans(
            ranges
                .iter()
                .map(|&(s, e, a)| MentionSpan::new(TextRange::new(s, e).unwrap(), user(a))),
        )
        .unwrap()
    }

    fn ranges(table: &SpanTable) -> Vec<(usize, usize)> {
        table.iter().map(|s| (s.start(), s.end())).collect()
    }

    fn edit(table: &mut SpanTable, start: usize, end: usize, text: &str) -> Rebase {
        let mut cache = CandidateCache::new();
        let consumed = TextRange::new(start, end).unwrap();
        let position = classify(table, consumed);
        rebase(table, &mut cache, &position, consumed, text)
    }

    // --- Shifting ---

    #[test]
    fn test_insert_before_span_shifts_it() {
        // "hi @al how are you"
        let mut t = table(&[(3, 6, "al")]);
        edit(&mut t, 0, 0, "!");
        assert_eq!(ranges(&t), vec![(4, 7)]);
    }

    #[test]
    fn test_delete_before_span_shifts_it_back() {
        let mut t = table(&[(3, 6, "al")]);
        let result = edit(&mut t, 0, 3, "");
        assert_eq!(result.delta, -3);
        assert_eq!(ranges(&t), vec![(0, 3)]);
    }

    #[test]
    fn test_insert_at_span_start_moves_span() {
        let mut t = table(&[(3, 6, "al")]);
        edit(&mut t, 3, 3, "xy");
        assert_eq!(ranges(&t), vec![(5, 8)]);
    }

    #[test]
    fn test_insert_at_span_end_leaves_span() {
        let mut t = table(&[(3, 6, "al")]);
        edit(&mut t, 6, 6, "xy");
        assert_eq!(ranges(&t), vec![(3, 6)]);
    }

    #[test]
    fn test_between_spans_shifts_only_later() {
        let mut t = table(&[(0, 3, "a"), (8, 10, "b"), (12, 14, "c")]);
        edit(&mut t, 5, 5, "1234");
        assert_eq!(ranges(&t), vec![(0, 3), (12, 14), (16, 18)]);
    }

    // --- Atomic mentions ---

    #[test]
    fn test_edit_inside_span_removes_whole_mention() {
        let mut cache = CandidateCache::new();
        cache.add(&user("al"));
        let mut t = table(&[(3, 6, "al"), (10, 12, "b")]);
        let consumed = TextRange::caret(4);
        let position = classify(&t, consumed);
        let result = rebase(&mut t, &mut cache, &position, consumed, "x");
        assert_eq!(result.consumed, TextRange::new(3, 6).unwrap());
        assert_eq!(result.delta, -2);
        assert_eq!(result.removed.len(), 1);
        assert_eq!(ranges(&t), vec![(8, 10)]);
        assert!(!cache.contains("al"));
    }

    #[test]
    fn test_backspace_at_span_end_removes_mention() {
        let mut t = table(&[(3, 6, "al")]);
        let result = edit(&mut t, 5, 6, "");
        assert_eq!(result.consumed, TextRange::new(3, 6).unwrap());
        assert!(t.is_empty());
    }

    #[test]
    fn test_overlap_removes_all_intersected() {
        let mut t = table(&[(0, 3, "a"), (5, 8, "b"), (10, 12, "c"), (20, 22, "d")]);
        let result = edit(&mut t, 2, 11, "Z");
        assert_eq!(result.removed.len(), 3);
        assert_eq!(result.consumed, TextRange::new(2, 11).unwrap());
        // 20 - 9 + 1
        assert_eq!(ranges(&t), vec![(12, 14)]);
    }

    #[test]
    fn test_release_keeps_candidate_still_mentioned() {
        let mut cache = CandidateCache::new();
        cache.add(&user("al"));
        let mut t = table(&[(0, 3, "al"), (5, 8, "al")]);
        let consumed = TextRange::caret(1);
        let position = classify(&t, consumed);
        rebase(&mut t, &mut cache, &position, consumed, "");
        assert!(cache.contains("al"));
    }

    // --- Mention insertion ---

    #[test]
    fn test_insert_mention_between_spans() {
        let mut cache = CandidateCache::new();
        let mut t = table(&[(0, 3, "a"), (10, 13, "c")]);
        // "@b" typed at [5, 7) becomes "@bob "
        let pending = TextRange::new(5, 7).unwrap();
        let position = classify(&t, pending);
        let span = insert_mention(&mut t, &mut cache, &position, pending, "@bob ", 4, &user("b"))
            .unwrap()
            .unwrap();
        assert_eq!(span.range, TextRange::new(5, 9).unwrap());
        assert_eq!(ranges(&t), vec![(0, 3), (5, 9), (13, 16)]);
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_insert_mention_inside_span_is_noop() {
        let mut cache = CandidateCache::new();
        let mut t = table(&[(0, 6, "a")]);
        let pending = TextRange::new(2, 4).unwrap();
        let position = classify(&t, pending);
        let result =
            insert_mention(&mut t, &mut cache, &position, pending, "@b ", 2, &user("b")).unwrap();
        assert!(result.is_none());
        assert_eq!(ranges(&t), vec![(0, 6)]);
        assert!(cache.is_empty());
    }
}
