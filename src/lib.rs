// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. spans::SpanTable)
    clippy::module_name_repetitions
)]

//! # Socialtext
//!
//! Mention tracking for plain-text social posts.
//!
//! The display text a user edits shows mentions as `@nickname`. Posts are
//! stored as markup in which each mention is a `<tagUser>@ACCOUNT</tagUser>`
//! tag. Socialtext keeps the mention spans of the display text correct
//! while it is edited and converts between the two forms.
//!
//! ## Architecture
//!
//! Every edit goes through the same pipeline:
//! - **Classify**: locate the edit relative to the mention spans
//! - **Rebase**: remove or shift spans for the edit
//! - **Apply**: change the text
//! - **Notify**: report the new text and any open mention query
//!
//! ## Modules
//!
//! - [`range`]: Half-open character ranges
//! - [`spans`]: Span table, classifier and rebaser
//! - [`markup`]: Posting markup codec
//! - [`scanner`]: Hashtag and URL detection
//! - [`editor`]: The editing engine
//! - [`policy`]: Mention editing switches
//! - [`config`]: Saved command-line defaults

pub mod config;
pub mod editor;
pub mod error;
pub mod markup;
pub mod policy;
pub mod range;
pub mod scanner;
pub mod spans;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::editor::{ChangeEvent, Edit, SocialEditor};
    pub use crate::error::{EditError, SpanError};
    pub use crate::markup::PostingContent;
    pub use crate::policy::EditPolicy;
    pub use crate::range::TextRange;
    pub use crate::scanner::{Element, ElementKind, ElementKinds, StyleApplier};
    pub use crate::spans::{MentionDictionary, MentionSpan, SpanTable, UserRef};
}
