use crate::range::TextRange;

/// An IME composition in progress.
///
/// While composing, the marked text is shown in the buffer but the span
/// table is left alone. The pending length change is always measured
/// against the text the composition replaced, never accumulated across
/// updates, so committing shifts the spans exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionState {
    origin: TextRange,
    original_text: String,
    marked: TextRange,
}

impl CompositionState {
    pub(crate) const fn begin(origin: TextRange, original_text: String) -> Self {
        Self {
            origin,
            original_text,
            marked: origin,
        }
    }

    /// The range the composition replaces, in pre-composition offsets.
    pub const fn origin(&self) -> TextRange {
        self.origin
    }

    /// The text the composition replaces.
    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    /// The marked text currently shown in the buffer.
    pub const fn marked(&self) -> TextRange {
        self.marked
    }

    /// Length change the composition would commit.
    #[allow(clippy::cast_possible_wrap)]
    pub const fn pending_delta(&self) -> isize {
        self.marked.len() as isize - self.origin.len() as isize
    }

    /// Record that the marked text is now `len` characters long.
    pub(crate) const fn mark(&mut self, len: usize) {
        self.marked = TextRange::with_len(self.origin.start(), len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_delta_is_measured_from_origin() {
        let mut state = CompositionState::begin(TextRange::new(2, 4).unwrap(), "ab".to_string());
        assert_eq!(state.pending_delta(), 0);
        state.mark(1);
        assert_eq!(state.pending_delta(), -1);
        state.mark(3);
        state.mark(5);
        assert_eq!(state.pending_delta(), 3);
        assert_eq!(state.marked(), TextRange::new(2, 7).unwrap());
    }
}
