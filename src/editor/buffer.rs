use ropey::Rope;

use crate::range::TextRange;

/// Direction for caret movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// A text buffer backed by a rope, addressed in character offsets.
///
/// Holds the display text and the current selection. An empty selection is
/// the caret. The buffer knows nothing about mentions; the editor decides
/// which edits reach it.
pub struct TextBuffer {
    rope: Rope,
    selection: TextRange,
    dirty: bool,
}

impl TextBuffer {
    /// Create a new buffer from a string, with the caret at the end.
    pub fn from_text(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let end = rope.len_chars();
        Self {
            rope,
            selection: TextRange::caret(end),
            dirty: false,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Length of the text in characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text covered by `range`, or `None` when it is out of bounds.
    pub fn slice(&self, range: TextRange) -> Option<String> {
        self.contains_range(range)
            .then(|| self.rope.slice(range.as_range()).to_string())
    }

    /// Character at `offset`.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.rope.len_chars()).then(|| self.rope.char(offset))
    }

    /// Whether `range` lies within the text.
    pub fn contains_range(&self, range: TextRange) -> bool {
        range.end() <= self.rope.len_chars()
    }

    /// The current selection.
    pub const fn selection(&self) -> TextRange {
        self.selection
    }

    /// The caret: the end of the selection.
    pub const fn caret(&self) -> usize {
        self.selection.end()
    }

    /// Select `range`, clamped to the text.
    pub fn select(&mut self, range: TextRange) {
        let len = self.rope.len_chars();
        let start = range.start().min(len);
        let end = range.end().min(len);
        self.selection = TextRange::with_len(start, end - start);
    }

    /// Place the caret at `offset`, clamped to the text.
    pub fn move_to(&mut self, offset: usize) {
        self.select(TextRange::caret(offset));
    }

    /// Move the caret one character, collapsing any selection.
    pub fn move_caret(&mut self, direction: Direction) {
        let selection = self.selection;
        let target = match direction {
            Direction::Left if !selection.is_empty() => selection.start(),
            Direction::Right if !selection.is_empty() => selection.end(),
            Direction::Left => selection.start().saturating_sub(1),
            Direction::Right => selection.end() + 1,
        };
        self.move_to(target);
    }

    /// Whether the buffer has been modified since creation or last save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the buffer as clean (e.g., after posting).
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Replace `range` with `text` and put the caret after the inserted
    /// text.
    ///
    /// Returns `false` and leaves the buffer untouched when `range` is out
    /// of bounds.
    pub fn replace(&mut self, range: TextRange, text: &str) -> bool {
        if !self.contains_range(range) {
            return false;
        }
        if range.is_empty() && text.is_empty() {
            self.move_to(range.start());
            return true;
        }
        self.rope.remove(range.as_range());
        self.rope.insert(range.start(), text);
        self.move_to(range.start() + text.chars().count());
        self.dirty = true;
        true
    }

    /// Replace the whole content, moving the caret to the end.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.move_to(self.rope.len_chars());
        self.dirty = false;
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field(
                "rope",
                &format_args!("Rope({} chars)", self.rope.len_chars()),
            )
            .field("selection", &self.selection)
            .field("dirty", &self.dirty)
            .finish()
    }
}
