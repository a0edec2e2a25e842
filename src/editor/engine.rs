use crate::error::EditError;
use crate::markup::{self, PostingContent};
use crate::policy::EditPolicy;
use crate::range::TextRange;
use crate::scanner::{self, Element, ElementKinds, StyleApplier};
use crate::spans::{
    CandidateCache, MentionDictionary, MentionSpan, Position, Rebase, SpanTable, UserRef,
    classify, insert_mention, rebase,
};

use super::buffer::{Direction, TextBuffer};
use super::composition::CompositionState;
use super::query::{CandidateSearch, MentionQuery, next_query};

/// Emitted once after every accepted edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Display text after the edit.
    pub text: String,
    /// The open mention query, if the edit left one.
    pub query: Option<MentionQuery>,
}

/// A single editing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Replace the selection with text.
    Insert(String),
    DeleteBackward,
    DeleteForward,
    Replace { range: TextRange, text: String },
    Select(TextRange),
    MoveCaret(Direction),
    BeginComposition,
    UpdateComposition(String),
    CommitComposition,
    CancelComposition,
    ConfirmMention(UserRef),
    DismissMention,
    RemoveMention(usize),
}

type ChangeListener = Box<dyn FnMut(&ChangeEvent)>;

/// Plain-text editor state with mention tracking.
///
/// Owns the text, the mention spans, the users confirmed since the last
/// load, any IME composition and the open mention query. Every edit runs to
/// completion (classify, rebase, apply, notify) before the next one starts.
pub struct SocialEditor {
    buffer: TextBuffer,
    spans: SpanTable,
    candidates: CandidateCache,
    composition: Option<CompositionState>,
    query: Option<MentionQuery>,
    policy: EditPolicy,
    listener: Option<ChangeListener>,
}

impl SocialEditor {
    pub fn new(policy: EditPolicy) -> Self {
        Self {
            buffer: TextBuffer::empty(),
            spans: SpanTable::new(),
            candidates: CandidateCache::new(),
            composition: None,
            query: None,
            policy,
            listener: None,
        }
    }

    /// Create an editor showing decoded `content`.
    pub fn from_posting(content: &PostingContent, policy: EditPolicy) -> Self {
        let mut editor = Self::new(policy);
        editor.set_posting_content(content);
        editor
    }

    /// Register the listener for [`ChangeEvent`]s, replacing any previous one.
    pub fn on_change(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Clear text, spans, pending mentions, composition and query together.
    pub fn reset(&mut self) {
        self.buffer = TextBuffer::empty();
        self.spans.clear();
        self.candidates.clear();
        self.composition = None;
        self.query = None;
    }

    // --- State accessors ---

    /// The display text.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    /// Mention spans. While composing they describe the text as it was
    /// before the composition began.
    pub const fn spans(&self) -> &SpanTable {
        &self.spans
    }

    /// Users mentioned since the content was last loaded.
    pub const fn pending_mentions(&self) -> &CandidateCache {
        &self.candidates
    }

    pub const fn selection(&self) -> TextRange {
        self.buffer.selection()
    }

    pub const fn composition(&self) -> Option<&CompositionState> {
        self.composition.as_ref()
    }

    pub const fn mention_query(&self) -> Option<&MentionQuery> {
        self.query.as_ref()
    }

    pub const fn policy(&self) -> EditPolicy {
        self.policy
    }

    pub const fn is_dirty(&self) -> bool {
        self.buffer.is_dirty()
    }

    /// Select `range`, clamped to the text. A caret moved off the open
    /// mention query closes it.
    pub fn set_selection(&mut self, range: TextRange) {
        self.buffer.select(range);
        self.close_query_if_left();
    }

    pub fn move_caret(&mut self, direction: Direction) {
        self.buffer.move_caret(direction);
        self.close_query_if_left();
    }

    // --- Posting content ---

    /// The content as posting markup plus the active users it mentions.
    ///
    /// While composing, the marked text is left out and the text the
    /// composition replaces is used, matching [`spans`](Self::spans).
    pub fn posting_content(&self) -> PostingContent {
        markup::to_posting(&self.committed_text(), self.spans.iter())
    }

    /// Reset and show decoded `content`.
    pub fn set_posting_content(&mut self, content: &PostingContent) {
        self.load_posting(&content.markup, &content.mentions);
    }

    /// Reset and show `markup` decoded against `dict`.
    pub fn load_posting(&mut self, markup: &str, dict: &MentionDictionary) {
        self.reset();
        let decoded = markup::decode(markup, dict, self.policy);
        self.buffer.set_text(&decoded.text);
        for span in decoded.spans {
            if let Err(err) = self.spans.insert(span) {
                tracing::warn!(%err, "dropping decoded mention");
            }
        }
        tracing::debug!(spans = self.spans.len(), "loaded posting content");
    }

    /// Mark the current content as persisted: the buffer is clean and no
    /// mention is pending any more.
    pub fn mark_posted(&mut self) {
        self.buffer.mark_clean();
        self.candidates.clear();
    }

    // --- Styling ---

    /// Mention, hashtag and URL elements of the display text.
    ///
    /// Like [`posting_content`](Self::posting_content), this describes the
    /// text without any marked text.
    pub fn elements(&self, kinds: ElementKinds) -> Vec<Element> {
        scanner::scan(&self.committed_text(), self.spans.as_slice(), kinds)
    }

    /// Hand the display text and its elements to `applier`.
    pub fn render<A: StyleApplier + ?Sized>(&self, applier: &mut A, kinds: ElementKinds) -> A::Output {
        let text = self.committed_text();
        let elements = scanner::scan(&text, self.spans.as_slice(), kinds);
        applier.apply(&text, &elements)
    }

    // --- Edits ---

    /// Run one [`Edit`].
    pub fn apply(&mut self, edit: Edit) -> Result<(), EditError> {
        match edit {
            Edit::Insert(text) => self.insert_text(&text).map(drop),
            Edit::DeleteBackward => self.delete_backward().map(drop),
            Edit::DeleteForward => self.delete_forward().map(drop),
            Edit::Replace { range, text } => self.replace(range, &text).map(drop),
            Edit::Select(range) => {
                self.set_selection(range);
                Ok(())
            }
            Edit::MoveCaret(direction) => {
                self.move_caret(direction);
                Ok(())
            }
            Edit::BeginComposition => self.begin_composition(),
            Edit::UpdateComposition(text) => self.update_composition(&text).map(drop),
            Edit::CommitComposition => self.commit_composition().map(drop),
            Edit::CancelComposition => self.cancel_composition(),
            Edit::ConfirmMention(user) => self.confirm_mention(&user).map(drop),
            Edit::DismissMention => {
                self.dismiss_mention_query();
                Ok(())
            }
            Edit::RemoveMention(index) => {
                self.remove_mention(index);
                Ok(())
            }
        }
    }

    /// Replace `range` with `text`.
    ///
    /// An edit inside a mention replaces the whole mention, and a selection
    /// crossing mentions removes them (or is rejected, depending on the
    /// policy). Remaining spans are rebased and the caret lands after the
    /// inserted text.
    pub fn replace(&mut self, range: TextRange, text: &str) -> Result<Rebase, EditError> {
        if self.composition.is_some() {
            return Err(EditError::CompositionActive);
        }
        self.apply_replace(range, text)
    }

    /// Replace the selection with `text`.
    pub fn insert_text(&mut self, text: &str) -> Result<Rebase, EditError> {
        self.replace(self.buffer.selection(), text)
    }

    /// Delete the selection, or the character before the caret.
    ///
    /// Returns `Ok(None)` when there is nothing to delete.
    pub fn delete_backward(&mut self) -> Result<Option<Rebase>, EditError> {
        let selection = self.buffer.selection();
        let range = if selection.is_empty() {
            let Some(start) = selection.start().checked_sub(1) else {
                return Ok(None);
            };
            TextRange::with_len(start, 1)
        } else {
            selection
        };
        self.replace(range, "").map(Some)
    }

    /// Delete the selection, or the character after the caret.
    pub fn delete_forward(&mut self) -> Result<Option<Rebase>, EditError> {
        let selection = self.buffer.selection();
        let range = if selection.is_empty() {
            if selection.end() >= self.buffer.len_chars() {
                return Ok(None);
            }
            TextRange::with_len(selection.start(), 1)
        } else {
            selection
        };
        self.replace(range, "").map(Some)
    }

    /// Delete mention `index` together with its text.
    ///
    /// An index out of range is a no-op.
    pub fn remove_mention(&mut self, index: usize) -> Option<MentionSpan> {
        let span = self.spans.get(index)?.clone();
        match self.replace(span.range, "") {
            Ok(_) => Some(span),
            Err(err) => {
                tracing::debug!(%err, index, "mention not removed");
                None
            }
        }
    }

    fn apply_replace(&mut self, range: TextRange, text: &str) -> Result<Rebase, EditError> {
        let len = self.buffer.len_chars();
        if range.end() > len {
            return Err(EditError::OutOfBounds { range, len });
        }
        if range.is_empty() && text.is_empty() {
            self.set_selection(range);
            return Ok(Rebase {
                consumed: range,
                delta: 0,
                removed: Vec::new(),
            });
        }

        let position = classify(&self.spans, range);
        if matches!(position, Position::Overlap(_))
            && !self.policy.clear_overlapped_mentions_on_selection_edit
        {
            tracing::debug!(%range, "selection edit over mentions rejected");
            return Err(EditError::OverlapsMention(range));
        }

        let result = rebase(
            &mut self.spans,
            &mut self.candidates,
            &position,
            range,
            text,
        );
        self.buffer.replace(result.consumed, text);
        self.query = next_query(&self.buffer, &self.spans, self.query.as_ref(), text);
        self.finish_edit();
        Ok(result)
    }

    // --- Composition ---

    /// Start composing over the current selection.
    ///
    /// A selection across mentions is rejected up front when the policy
    /// keeps overlapped mentions, since the commit would be rejected too.
    pub fn begin_composition(&mut self) -> Result<(), EditError> {
        if self.composition.is_some() {
            return Err(EditError::CompositionActive);
        }
        let origin = self.buffer.selection();
        if !self.policy.clear_overlapped_mentions_on_selection_edit
            && matches!(classify(&self.spans, origin), Position::Overlap(_))
        {
            tracing::debug!(%origin, "composition over mentions rejected");
            return Err(EditError::OverlapsMention(origin));
        }
        let original = self.buffer.slice(origin).unwrap_or_default();
        self.composition = Some(CompositionState::begin(origin, original));
        Ok(())
    }

    /// Show `text` as the marked text. Returns the pending length change
    /// relative to the text before the composition.
    pub fn update_composition(&mut self, text: &str) -> Result<isize, EditError> {
        let state = self.composition.as_mut().ok_or(EditError::NoComposition)?;
        self.buffer.replace(state.marked(), text);
        state.mark(text.chars().count());
        Ok(state.pending_delta())
    }

    /// Commit the marked text as a single edit of the original range.
    pub fn commit_composition(&mut self) -> Result<Rebase, EditError> {
        let state = self.composition.take().ok_or(EditError::NoComposition)?;
        let committed = self.buffer.slice(state.marked()).unwrap_or_default();
        self.buffer.replace(state.marked(), state.original_text());
        self.buffer.select(state.origin());
        tracing::debug!(origin = %state.origin(), delta = state.pending_delta(), "commit composition");
        self.apply_replace(state.origin(), &committed)
    }

    /// Drop the marked text and restore the text the composition replaced.
    pub fn cancel_composition(&mut self) -> Result<(), EditError> {
        let state = self.composition.take().ok_or(EditError::NoComposition)?;
        self.buffer.replace(state.marked(), state.original_text());
        self.buffer.select(state.origin());
        Ok(())
    }

    // --- Mentions ---

    /// Candidates for the open mention query; empty when none is open.
    pub fn search_candidates<S: CandidateSearch + ?Sized>(&self, search: &S) -> Vec<UserRef> {
        self.query
            .as_ref()
            .map(|query| search.search(query.prefix.as_deref()))
            .unwrap_or_default()
    }

    /// Replace the open mention query with a mention of `user`.
    ///
    /// Inserts `@nickname` and a separator, and records the new span.
    /// Returns `Ok(None)` when no query is open, the query sits inside an
    /// existing mention or `user` is inactive. Inactive users never get a
    /// span, since posting content only carries active users.
    pub fn confirm_mention(&mut self, user: &UserRef) -> Result<Option<MentionSpan>, EditError> {
        if self.composition.is_some() {
            return Err(EditError::CompositionActive);
        }
        if !user.active {
            tracing::debug!(account = %user.account, "inactive user not mentioned");
            return Ok(None);
        }
        let Some(query) = self.query.take() else {
            return Ok(None);
        };
        if !self.buffer.contains_range(query.range) {
            return Ok(None);
        }

        let (inserted, span_len) = self.policy.mention_text(&user.nickname);
        let position = classify(&self.spans, query.range);
        let span = insert_mention(
            &mut self.spans,
            &mut self.candidates,
            &position,
            query.range,
            &inserted,
            span_len,
            user,
        )?;
        if span.is_some() {
            self.buffer.replace(query.range, &inserted);
            tracing::debug!(account = %user.account, "confirmed mention");
            self.finish_edit();
        }
        Ok(span)
    }

    pub fn dismiss_mention_query(&mut self) {
        self.query = None;
    }

    // --- Internals ---

    /// The display text with any marked text replaced by the text the
    /// composition started from.
    fn committed_text(&self) -> String {
        let Some(state) = &self.composition else {
            return self.buffer.text();
        };
        let marked = state.marked();
        let text = self.buffer.text();
        let mut chars = text.chars();
        let mut committed: String = chars.by_ref().take(marked.start()).collect();
        committed.push_str(state.original_text());
        committed.extend(chars.skip(marked.len()));
        committed
    }

    fn close_query_if_left(&mut self) {
        let caret = self.buffer.caret();
        if self
            .query
            .as_ref()
            .is_some_and(|query| caret != query.range.end())
        {
            self.query = None;
        }
    }

    fn finish_edit(&mut self) {
        debug_assert!(
            self.spans.check_invariants(self.buffer.len_chars()).is_ok(),
            "{:?}",
            self.spans.check_invariants(self.buffer.len_chars())
        );
        let Some(listener) = self.listener.as_mut() else {
            return;
        };
        let event = ChangeEvent {
            text: self.buffer.text(),
            query: self.query.clone(),
        };
        listener(&event);
    }
}

impl Default for SocialEditor {
    fn default() -> Self {
        Self::new(EditPolicy::default())
    }
}

impl std::fmt::Debug for SocialEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocialEditor")
            .field("buffer", &self.buffer)
            .field("spans", &self.spans.len())
            .field("candidates", &self.candidates.len())
            .field("composition", &self.composition)
            .field("query", &self.query)
            .field("policy", &self.policy)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}
