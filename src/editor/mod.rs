//! Mention-aware plain-text editor.
//!
//! [`SocialEditor`] keeps a rope-backed text buffer and its mention spans in
//! step: every edit is classified against the spans, the spans are rebased
//! and only then is the text changed and a [`ChangeEvent`] emitted.

mod buffer;
mod composition;
mod engine;
mod query;


pub use buffer::{Direction, TextBuffer};
pub use composition::CompositionState;
pub use engine::{ChangeEvent, Edit, SocialEditor};
pub use query::{CandidateSearch, MENTION_MARKER, MentionQuery};
