//! Hashtag and URL detection.
//!
//! Secondary elements are found by pattern over the display text and laid
//! beneath the mention spans: a match that overlaps or touches a mention is
//! dropped, so mentions are never split by scanning.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::range::TextRange;
use crate::spans::MentionSpan;

static HASHTAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\p{L}\p{N}_&#])(#[\p{L}\p{N}_]+)").expect("valid hashtag pattern")
});

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"]+"#).expect("valid url pattern")
});

/// Characters that end a sentence rather than a URL.
const URL_TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"', ')', ']', '}'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Mention,
    Hashtag,
    Url,
}

/// Which element kinds to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementKinds {
    pub mention: bool,
    pub hashtag: bool,
    pub url: bool,
}

impl ElementKinds {
    pub const fn all() -> Self {
        Self {
            mention: true,
            hashtag: true,
            url: true,
        }
    }

    pub const fn contains(self, kind: ElementKind) -> bool {
        match kind {
            ElementKind::Mention => self.mention,
            ElementKind::Hashtag => self.hashtag,
            ElementKind::Url => self.url,
        }
    }
}

impl Default for ElementKinds {
    fn default() -> Self {
        Self::all()
    }
}

/// A styled region of the display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub kind: ElementKind,
    pub range: TextRange,
    /// Account for mentions, tag name without `#` for hashtags, the
    /// address for URLs.
    pub content: String,
}

/// Collect mention, hashtag and URL elements of `text`, ordered by start.
///
/// Mentions of inactive users produce no element.
pub fn scan(text: &str, mentions: &[MentionSpan], kinds: ElementKinds) -> Vec<Element> {
    let mut elements = Vec::new();

    if kinds.contains(ElementKind::Mention) {
        elements.extend(
            mentions
                .iter()
                .filter(|span| span.user.active)
                .map(|span| Element {
                    kind: ElementKind::Mention,
                    range: span.range,
                    content: span.user.account.clone(),
                }),
        );
    }

    let clear_of_mentions =
        |range: TextRange| !mentions.iter().any(|span| span.range.touches(range));

    if kinds.contains(ElementKind::Hashtag) {
        elements.extend(
            hashtags(text)
                .into_iter()
                .filter(|element| clear_of_mentions(element.range)),
        );
    }
    if kinds.contains(ElementKind::Url) {
        elements.extend(
            urls(text)
                .into_iter()
                .filter(|element| clear_of_mentions(element.range)),
        );
    }

    elements.sort_by_key(|element| (element.range.start(), element.range.end()));
    elements
}

/// Every hashtag in `text`.
pub fn hashtags(text: &str) -> Vec<Element> {
    let mut offsets = CharOffsets::new(text);
    HASHTAG_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            let start = offsets.char_at(m.start());
            let end = offsets.char_at(m.end());
            Element {
                kind: ElementKind::Hashtag,
                range: TextRange::with_len(start, end - start),
                content: m.as_str().trim_start_matches('#').to_string(),
            }
        })
        .collect()
}

/// Every URL in `text`, without trailing sentence punctuation.
pub fn urls(text: &str) -> Vec<Element> {
    let mut offsets = CharOffsets::new(text);
    URL_PATTERN
        .find_iter(text)
        .filter_map(|m| {
            let url = m.as_str().trim_end_matches(URL_TRAILING_PUNCTUATION);
            if url.is_empty() {
                return None;
            }
            let start = offsets.char_at(m.start());
            let end = offsets.char_at(m.start() + url.len());
            Some(Element {
                kind: ElementKind::Url,
                range: TextRange::with_len(start, end - start),
                content: url.to_string(),
            })
        })
        .collect()
}

/// Receives the display text and its elements for styling.
///
/// The engine never styles text itself; a front end implements this to
/// turn elements into whatever attributed form it draws.
pub trait StyleApplier {
    type Output;

    fn apply(&mut self, text: &str, elements: &[Element]) -> Self::Output;
}

/// A run of display text with the element kind covering it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: Option<ElementKind>,
    pub text: String,
}

/// Splits the text into plain and styled [`Segment`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct Segments;

impl StyleApplier for Segments {
    type Output = Vec<Segment>;

    fn apply(&mut self, text: &str, elements: &[Element]) -> Vec<Segment> {
        let chars: Vec<char> = text.chars().collect();
        let mut segments = Vec::new();
        let mut cursor = 0;
        let mut push = |kind: Option<ElementKind>, from: usize, to: usize| {
            if from < to {
                segments.push(Segment {
                    kind,
                    text: chars[from..to].iter().collect(),
                });
            }
        };
        for element in elements {
            let start = element.range.start().max(cursor).min(chars.len());
            let end = element.range.end().min(chars.len());
            push(None, cursor, start);
            push(Some(element.kind), start, end);
            cursor = cursor.max(end);
        }
        push(None, cursor, chars.len());
        segments
    }
}

/// Converts ascending byte offsets into character offsets in one pass.
struct CharOffsets<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharOffsets<'a> {
    const fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    /// Character offset of `byte`, which must not precede the last query.
    fn char_at(&mut self, byte: usize) -> usize {
        if byte > self.byte {
            self.chars += self.text[self.byte..byte].chars().count();
            self.byte = byte;
        }
        self.chars
    }
}
