//! Editing policy switches.

/// Character inserted after a confirmed mention.
pub const MENTION_SEPARATOR: char = ' ';

/// Behaviour switches for mention handling.
///
/// Both defaults match the common case: the separator after a mention is
/// plain text, and a selection edit over mentions removes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditPolicy {
    /// Whether the span of a confirmed mention covers the separator typed
    /// after it.
    pub include_trailing_separator: bool,
    /// Whether replacing a selection that crosses mention boundaries
    /// removes those mentions. When off, such edits are rejected.
    pub clear_overlapped_mentions_on_selection_edit: bool,
}

impl Default for EditPolicy {
    fn default() -> Self {
        Self {
            include_trailing_separator: false,
            clear_overlapped_mentions_on_selection_edit: true,
        }
    }
}

impl EditPolicy {
    /// Text inserted for a mention of `nickname`, and how many of its
    /// characters the mention span covers.
    pub fn mention_text(self, nickname: &str) -> (String, usize) {
        let label = format!("@{nickname}");
        let label_len = label.chars().count();
        let text = format!("{label}{MENTION_SEPARATOR}");
        if self.include_trailing_separator {
            (text, label_len + 1)
        } else {
            (text, label_len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_text_excludes_separator_by_default() {
        let (text, span_len) = EditPolicy::default().mention_text("Al");
        assert_eq!(text, "@Al ");
        assert_eq!(span_len, 3);
    }

    #[test]
    fn test_mention_text_can_include_separator() {
        let policy = EditPolicy {
            include_trailing_separator: true,
            ..EditPolicy::default()
        };
        let (text, span_len) = policy.mention_text("Zoë");
        assert_eq!(text, "@Zoë ");
        assert_eq!(span_len, 5);
    }
}
