//! Mention span tracking.
//!
//! The [`SpanTable`] holds the mentions of a text buffer. Every edit is
//! first located with [`classify`] and then applied to the table with
//! [`rebase`], which keeps offsets in step with the text.

mod classify;
mod rebase;
mod table;
mod types;

pub use classify::{Position, classify, classify_offset};
pub use rebase::{Rebase, insert_mention, rebase};
pub use table::SpanTable;
pub use types::{CandidateCache, MentionDictionary, MentionSpan, UserRef};
