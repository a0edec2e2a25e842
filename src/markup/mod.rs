//! Conversion between display text and posting markup.
//!
//! Display text is what the user edits: mentions appear as `@nickname`,
//! tracked by [`MentionSpan`]s. Posting markup is what gets stored and
//! sent: each mention becomes `<tagUser>@account</tagUser>`, which survives
//! nickname changes.

use std::collections::VecDeque;

use once_cell::sync::Lazy;
use regex::Regex;
use ropey::Rope;
use serde::{Deserialize, Serialize};

use crate::policy::EditPolicy;
use crate::range::{TextRange, char_len};
use crate::spans::{MentionDictionary, MentionSpan, SpanTable};

pub const TAG_OPEN: &str = "<tagUser>@";
pub const TAG_CLOSE: &str = "</tagUser>";

/// `ACCOUNT` is any run of characters other than `<` and `>`.
static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<tagUser>@([^<>]+)</tagUser>").expect("valid tag pattern"));

/// Content in posting form, with the users its markup refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingContent {
    pub markup: String,
    #[serde(default)]
    pub mentions: MentionDictionary,
}

impl PostingContent {
    pub fn new(markup: impl Into<String>, mentions: MentionDictionary) -> Self {
        Self {
            markup: markup.into(),
            mentions,
        }
    }
}

/// Display text and mention spans recovered from markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub spans: Vec<MentionSpan>,
}

impl Decoded {
    /// Collect the spans into a table.
    ///
    /// Decoded spans never overlap, so this only fails on spans that were
    /// added by hand afterwards.
    pub fn table(&self) -> Result<SpanTable, crate::error::SpanError> {
        SpanTable::from_spans(self.spans.iter().cloned())
    }
}

/// Posting tag for `account`.
pub fn tag_for(account: &str) -> String {
    format!("{TAG_OPEN}{account}{TAG_CLOSE}")
}

/// Convert display text to posting markup.
///
/// Spans are replaced earliest first. Each replacement changes the length
/// of the text, so every span still waiting is moved by the difference
/// between the tag length and the replaced span length before the next one
/// is processed. Spans reaching past the end of `text` are skipped.
pub fn encode(text: &str, spans: &[MentionSpan]) -> String {
    let mut queue: Vec<(TextRange, &str)> = spans
        .iter()
        .map(|span| (span.range, span.user.account.as_str()))
        .collect();
    queue.sort_by_key(|(range, _)| range.start());
    let mut queue = VecDeque::from(queue);

    let mut rope = Rope::from_str(text);
    while let Some((range, account)) = queue.pop_front() {
        if range.end() > rope.len_chars() {
            tracing::debug!(%range, account, "skipping span past end of text");
            continue;
        }
        let tag = tag_for(account);
        rope.remove(range.as_range());
        rope.insert(range.start(), &tag);

        let delta = crate::range::edit_delta(range, &tag);
        for (pending, _) in &mut queue {
            *pending = pending.shifted(delta);
        }
    }
    rope.to_string()
}

/// Convert posting markup to display text and mention spans.
///
/// Tags are resolved left to right against `dict`. A known, active account
/// becomes `@nickname` with a span covering the marker and the nickname
/// (and the separator after it when `policy` includes it). An inactive
/// account becomes plain `@nickname`, an unknown one plain `@account`;
/// neither gets a span. Anything that is not a well-formed tag is kept as
/// literal text, so decoding never fails.
pub fn decode(markup: &str, dict: &MentionDictionary, policy: EditPolicy) -> Decoded {
    let mut text = String::with_capacity(markup.len());
    let mut text_len = 0;
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in TAG_PATTERN.captures_iter(markup) {
        let (Some(whole), Some(account)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let literal = &markup[last..whole.start()];
        text.push_str(literal);
        text_len += char_len(literal);
        last = whole.end();

        let account = account.as_str();
        let rendered = match dict.get(account) {
            Some(user) if user.active => {
                let (rendered, span_len) = if policy.include_trailing_separator {
                    policy.mention_text(&user.nickname)
                } else {
                    let label = user.display_text();
                    let len = char_len(&label);
                    (label, len)
                };
                spans.push(MentionSpan::new(
                    TextRange::with_len(text_len, span_len),
                    user.clone(),
                ));
                rendered
            }
            Some(user) => {
                tracing::debug!(account, "inactive account rendered as text");
                user.display_text()
            }
            None => {
                tracing::debug!(account, "unknown account rendered as text");
                format!("@{account}")
            }
        };
        text_len += char_len(&rendered);
        text.push_str(&rendered);
    }
    text.push_str(&markup[last..]);

    Decoded { text, spans }
}

/// Dictionary of the active users referred to by `spans`.
pub fn posting_mentions<'a>(spans: impl IntoIterator<Item = &'a MentionSpan>) -> MentionDictionary {
    spans
        .into_iter()
        .filter(|span| span.user.active)
        .map(|span| span.user.clone())
        .collect()
}

/// Encode display text together with the users it mentions.
pub fn to_posting<'a>(text: &str, spans: impl IntoIterator<Item = &'a MentionSpan>) -> PostingContent {
    let spans: Vec<MentionSpan> = spans.into_iter().cloned().collect();
    PostingContent::new(encode(text, &spans), posting_mentions(&spans))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spans::UserRef;

    fn dict() -> MentionDictionary {
        [
            UserRef::new("alice", "Al"),
            UserRef::new("bob", "Bobby"),
            UserRef::new("carol", "Carol").inactive(),
        ]
        .into_iter()
        .collect()
    }

    fn span(start: usize, end: usize, user: UserRef) -> MentionSpan {
        MentionSpan::new(TextRange::new(start, end).unwrap(), user)
    }

    // --- Encoding ---

    #[test]
    fn test_encode_single_mention() {
        let spans = [span(3, 6, UserRef::new("alice", "al"))];
        assert_eq!(encode("hi @al", &spans), "hi <tagUser>@alice</tagUser>");
    }

    #[test]
    fn test_encode_adjusts_later_spans() {
        let text = "@Al and @Bobby!";
        let spans = [
            span(8, 14, UserRef::new("bob", "Bobby")),
            span(0, 3, UserRef::new("alice", "Al")),
        ];
        assert_eq!(
            encode(text, &spans),
            "<tagUser>@alice</tagUser> and <tagUser>@bob</tagUser>!"
        );
    }

    #[test]
    fn test_encode_without_spans_is_identity() {
        assert_eq!(encode("plain #text", &[]), "plain #text");
    }

    #[test]
    fn test_encode_counts_chars_not_bytes() {
        let text = "héllo @Al ünd";
        let spans = [span(6, 9, UserRef::new("alice", "Al"))];
        assert_eq!(encode(text, &spans), "héllo <tagUser>@alice</tagUser> ünd");
    }

    #[test]
    fn test_encode_skips_span_past_end() {
        let spans = [span(3, 10, UserRef::new("alice", "Al"))];
        assert_eq!(encode("hi @Al", &spans), "hi @Al");
    }

    // --- Decoding ---

    #[test]
    fn test_decode_known_active_account() {
        let decoded = decode("hi <tagUser>@alice</tagUser>", &dict(), EditPolicy::default());
        assert_eq!(decoded.text, "hi @Al");
        assert_eq!(decoded.spans.len(), 1);
        assert_eq!(decoded.spans[0].range, TextRange::new(3, 6).unwrap());
        assert_eq!(decoded.spans[0].user.account, "alice");
    }

    #[test]
    fn test_decode_unknown_account_has_no_span() {
        let decoded = decode("hi <tagUser>@zed</tagUser>!", &dict(), EditPolicy::default());
        assert_eq!(decoded.text, "hi @zed!");
        assert!(decoded.spans.is_empty());
    }

    #[test]
    fn test_decode_inactive_account_is_plain_nickname() {
        let decoded = decode("<tagUser>@carol</tagUser>", &dict(), EditPolicy::default());
        assert_eq!(decoded.text, "@Carol");
        assert!(decoded.spans.is_empty());
    }

    #[test]
    fn test_decode_malformed_tags_stay_literal() {
        let markup = "a <tagUser>@</tagUser> b <tagUser>@x<y</tagUser> <tagUser>alice</tagUser>";
        let decoded = decode(markup, &dict(), EditPolicy::default());
        assert_eq!(decoded.text, markup);
        assert!(decoded.spans.is_empty());
    }

    #[test]
    fn test_decode_multiple_tags_offsets() {
        let markup = "<tagUser>@alice</tagUser>, <tagUser>@zed</tagUser> & <tagUser>@bob</tagUser>";
        let decoded = decode(markup, &dict(), EditPolicy::default());
        assert_eq!(decoded.text, "@Al, @zed & @Bobby");
        let ranges: Vec<_> = decoded.spans.iter().map(|s| s.range.as_range()).collect();
        assert_eq!(ranges, vec![0..3, 12..18]);
    }

    #[test]
    fn test_decode_with_trailing_separator_policy() {
        let policy = EditPolicy {
            include_trailing_separator: true,
            ..EditPolicy::default()
        };
        let decoded = decode("<tagUser>@alice</tagUser>hi", &dict(), policy);
        assert_eq!(decoded.text, "@Al hi");
        assert_eq!(decoded.spans[0].range, TextRange::new(0, 4).unwrap());
    }

    // --- Round trips ---

    #[test]
    fn test_round_trip_display_text() {
        let text = "ping @Al and @Bobby about #launch";
        let spans = vec![
            span(5, 8, UserRef::new("alice", "Al")),
            span(13, 19, UserRef::new("bob", "Bobby")),
        ];
        let decoded = decode(&encode(text, &spans), &dict(), EditPolicy::default());
        assert_eq!(decoded.text, text);
        assert_eq!(decoded.spans, spans);
    }

    #[test]
    fn test_round_trip_with_trailing_separator() {
        let policy = EditPolicy {
            include_trailing_separator: true,
            ..EditPolicy::default()
        };
        let text = "@Al @Bobby done";
        let spans = vec![
            span(0, 4, UserRef::new("alice", "Al")),
            span(4, 11, UserRef::new("bob", "Bobby")),
        ];
        let markup = encode(text, &spans);
        assert_eq!(markup, "<tagUser>@alice</tagUser><tagUser>@bob</tagUser>done");
        let decoded = decode(&markup, &dict(), policy);
        assert_eq!(decoded.text, text);
        assert_eq!(decoded.spans, spans);
    }

    #[test]
    fn test_posting_mentions_lists_active_users_once() {
        let spans = [
            span(0, 3, UserRef::new("alice", "Al")),
            span(4, 7, UserRef::new("alice", "Al")),
            span(8, 14, UserRef::new("carol", "Carol").inactive()),
        ];
        let mentions = posting_mentions(&spans);
        assert_eq!(mentions.len(), 1);
        assert!(mentions.contains("alice"));
    }
}
