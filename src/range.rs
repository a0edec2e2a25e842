//! Half-open character intervals.
//!
//! Every offset in this crate counts Unicode scalar values (`char`s), not
//! bytes. A [`TextRange`] covers `[start, end)`: `start` is the first
//! character inside the range and `end` is the first character after it.
//! An empty range (`start == end`) is a caret position.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::error::SpanError;

/// A half-open `[start, end)` interval over character offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TextRange {
    start: usize,
    end: usize,
}

impl TextRange {
    /// Create a range, rejecting `start > end`.
    pub const fn new(start: usize, end: usize) -> Result<Self, SpanError> {
        if start > end {
            return Err(SpanError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create an empty range at `offset`.
    pub const fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Create a range from a start offset and a length.
    pub const fn with_len(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    pub const fn start(self) -> usize {
        self.start
    }

    pub const fn end(self) -> usize {
        self.end
    }

    pub const fn len(self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` lies strictly between `start` and `end`.
    ///
    /// Boundary offsets are not interior, so a caret sitting directly
    /// before or after the range is outside it.
    pub const fn has_interior(self, offset: usize) -> bool {
        self.start < offset && offset < self.end
    }

    /// Whether `other` intersects this range.
    ///
    /// Two ranges intersect when their interiors overlap or a boundary of
    /// one lies strictly inside the other. Ranges that only touch at an
    /// endpoint do not intersect. For an empty `other` this is
    /// [`has_interior`](Self::has_interior).
    pub const fn intersects(self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies within `[start, end]`, endpoints included.
    pub const fn encloses(self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the ranges overlap or share an endpoint.
    pub const fn touches(self, other: Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Move the range by `delta`, clamping `start` at zero.
    ///
    /// The length is preserved.
    #[must_use]
    pub const fn shifted(self, delta: isize) -> Self {
        let start = self.start.saturating_add_signed(delta);
        Self {
            start,
            end: start + self.len(),
        }
    }

    /// Returns this range as a `Range<usize>`.
    pub const fn as_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<TextRange> for Range<usize> {
    fn from(value: TextRange) -> Self {
        value.as_range()
    }
}

impl TryFrom<Range<usize>> for TextRange {
    type Error = SpanError;

    fn try_from(value: Range<usize>) -> Result<Self, Self::Error> {
        Self::new(value.start, value.end)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Character length of `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Length difference produced by replacing `consumed` with `replacement`.
#[allow(clippy::cast_possible_wrap)]
pub fn edit_delta(consumed: TextRange, replacement: &str) -> isize {
    char_len(replacement) as isize - consumed.len() as isize
}
