use crate::range::TextRange;
use crate::spans::{MentionDictionary, SpanTable, UserRef};

use super::buffer::TextBuffer;

/// Marker that opens a mention.
pub const MENTION_MARKER: char = '@';

/// An `@` prefix the user is typing that has not been confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionQuery {
    /// The typed text, marker included.
    pub range: TextRange,
    /// Text after the marker; `None` right after typing `@`.
    pub prefix: Option<String>,
}

/// Source of mention candidates for an open query.
pub trait CandidateSearch {
    /// Candidates for `prefix`, best first. `None` asks for everyone.
    fn search(&self, prefix: Option<&str>) -> Vec<UserRef>;
}

impl CandidateSearch for MentionDictionary {
    /// Active users matching `prefix` case-insensitively.
    ///
    /// Exact matches rank first, then nickname prefixes, account prefixes
    /// and finally substrings of either; ties sort by nickname.
    fn search(&self, prefix: Option<&str>) -> Vec<UserRef> {
        let needle = prefix.map(str::to_lowercase).unwrap_or_default();
        let mut ranked: Vec<(u8, String, &UserRef)> = self
            .users()
            .filter(|user| user.active)
            .filter_map(|user| {
                match_priority(user, &needle).map(|p| (p, user.nickname.to_lowercase(), user))
            })
            .collect();
        ranked.sort_by(|a, b| (a.0, &a.1, &a.2.account).cmp(&(b.0, &b.1, &b.2.account)));
        ranked.into_iter().map(|(_, _, user)| user.clone()).collect()
    }
}

fn match_priority(user: &UserRef, needle: &str) -> Option<u8> {
    if needle.is_empty() {
        return Some(0);
    }
    let nickname = user.nickname.to_lowercase();
    let account = user.account.to_lowercase();
    if nickname == needle || account == needle {
        Some(0)
    } else if nickname.starts_with(needle) {
        Some(1)
    } else if account.starts_with(needle) {
        Some(2)
    } else if nickname.contains(needle) || account.contains(needle) {
        Some(3)
    } else {
        None
    }
}

/// Work out the open mention query after an edit that inserted `inserted`.
///
/// A freshly typed `@` opens a query unless a mention already starts there.
/// An open query follows the caret as long as its text still starts with
/// the marker and holds no whitespace. A newline closes it.
pub(crate) fn next_query(
    buffer: &TextBuffer,
    spans: &SpanTable,
    current: Option<&MentionQuery>,
    inserted: &str,
) -> Option<MentionQuery> {
    if inserted.contains('\n') {
        return None;
    }
    let caret = buffer.caret();
    let typed = caret.checked_sub(1)?;

    if inserted.ends_with(MENTION_MARKER)
        && buffer.char_at(typed) == Some(MENTION_MARKER)
        && spans.span_starting_at(typed).is_none()
    {
        return Some(MentionQuery {
            range: TextRange::with_len(typed, 1),
            prefix: None,
        });
    }

    let current = current?;
    if caret <= current.range.start() {
        return None;
    }
    let range = TextRange::with_len(current.range.start(), caret - current.range.start());
    let typed_text = buffer.slice(range)?;
    let rest = typed_text.strip_prefix(MENTION_MARKER)?;
    if rest.chars().any(char::is_whitespace) || rest.contains(MENTION_MARKER) {
        return None;
    }
    Some(MentionQuery {
        range,
        prefix: (!rest.is_empty()).then(|| rest.to_string()),
    })
}
