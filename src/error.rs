//! Error types for span and edit operations.
//!
//! Every failure here is local and recoverable: callers either retry with
//! different input or treat the operation as a no-op.

use thiserror::Error;

use crate::range::TextRange;

/// Errors raised by [`TextRange`] construction and the span table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
    #[error("invalid range {start}..{end}: start > end")]
    InvertedRange { start: usize, end: usize },

    #[error("mention span {0} is empty")]
    EmptySpan(TextRange),

    #[error("mention span {new} overlaps existing span {existing}")]
    Overlap { new: TextRange, existing: TextRange },

    #[error("span index {index} out of bounds for {len} spans")]
    Index { index: usize, len: usize },
}

/// Errors raised by [`SocialEditor`](crate::editor::SocialEditor) edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("range {range} out of bounds for text of {len} chars")]
    OutOfBounds { range: TextRange, len: usize },

    #[error("a composition is in progress")]
    CompositionActive,

    #[error("no composition is in progress")]
    NoComposition,

    #[error("selection {0} overlaps a mention and overlapped mentions are kept")]
    OverlapsMention(TextRange),

    #[error(transparent)]
    Span(#[from] SpanError),
}
