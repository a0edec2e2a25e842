//! Mention span value types.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::range::TextRange;

fn default_active() -> bool {
    true
}

/// A mentionable user.
///
/// Two users are the same user when their `account` matches; the nickname
/// and active flag are display data.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// Stable, unique identity embedded in posting markup.
    pub account: String,
    /// Label shown in the display text after the `@` marker.
    #[serde(alias = "nickName")]
    pub nickname: String,
    /// Inactive users decode to plain text and are never styled.
    #[serde(default = "default_active", alias = "shouldActive")]
    pub active: bool,
}

impl UserRef {
    pub fn new(account: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            nickname: nickname.into(),
            active: true,
        }
    }

    /// The same user, marked inactive.
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Display text for this user: `@` followed by the nickname.
    pub fn display_text(&self) -> String {
        format!("@{}", self.nickname)
    }
}

impl PartialEq for UserRef {
    fn eq(&self, other: &Self) -> bool {
        self.account == other.account
    }
}

impl Hash for UserRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.account.hash(state);
    }
}

/// A user mention occupying a range of the display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionSpan {
    pub range: TextRange,
    pub user: UserRef,
}

impl MentionSpan {
    pub const fn new(range: TextRange, user: UserRef) -> Self {
        Self { range, user }
    }

    pub const fn start(&self) -> usize {
        self.range.start()
    }

    pub const fn end(&self) -> usize {
        self.range.end()
    }
}

/// Lookup table from account to user, used to decode posting markup.
///
/// Serializes as a plain JSON object keyed by account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MentionDictionary {
    users: BTreeMap<String, UserRef>,
}

impl MentionDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `user.account`.
    pub fn insert(&mut self, user: UserRef) {
        self.users.insert(user.account.clone(), user);
    }

    pub fn get(&self, account: &str) -> Option<&UserRef> {
        self.users.get(account)
    }

    /// The user for `account`, only when present and active.
    pub fn active(&self, account: &str) -> Option<&UserRef> {
        self.get(account).filter(|user| user.active)
    }

    pub fn remove(&mut self, account: &str) -> Option<UserRef> {
        self.users.remove(account)
    }

    pub fn contains(&self, account: &str) -> bool {
        self.users.contains_key(account)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Users in account order.
    pub fn users(&self) -> impl Iterator<Item = &UserRef> {
        self.users.values()
    }
}

impl FromIterator<UserRef> for MentionDictionary {
    fn from_iter<I: IntoIterator<Item = UserRef>>(iter: I) -> Self {
        let mut dict = Self::new();
        for user in iter {
            dict.insert(user);
        }
        dict
    }
}

/// Users confirmed in this session that have not been persisted yet.
///
/// Keyed by account, so mentioning the same user twice keeps one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateCache {
    users: BTreeMap<String, UserRef>,
}

impl CandidateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, user: &UserRef) {
        self.users.insert(user.account.clone(), user.clone());
    }

    pub fn remove(&mut self, account: &str) -> Option<UserRef> {
        self.users.remove(account)
    }

    pub fn contains(&self, account: &str) -> bool {
        self.users.contains_key(account)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn clear(&mut self) {
        self.users.clear();
    }

    pub fn users(&self) -> impl Iterator<Item = &UserRef> {
        self.users.values()
    }

    /// Snapshot as a dictionary.
    pub fn to_dictionary(&self) -> MentionDictionary {
        self.users.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_compare_by_account() {
        let a = UserRef::new("alice", "Al");
        let b = UserRef::new("alice", "Alice").inactive();
        assert_eq!(a, b);
        assert_ne!(a, UserRef::new("bob", "Al"));
    }

    #[test]
    fn test_display_text_prefixes_marker() {
        assert_eq!(UserRef::new("alice", "Al").display_text(), "@Al");
    }

    #[test]
    fn test_dictionary_active_filters_inactive() {
        let dict: MentionDictionary = [
            UserRef::new("alice", "Al"),
            UserRef::new("bob", "Bob").inactive(),
        ]
        .into_iter()
        .collect();
        assert!(dict.active("alice").is_some());
        assert!(dict.active("bob").is_none());
        assert!(dict.get("bob").is_some());
        assert!(dict.active("carol").is_none());
    }

    #[test]
    fn test_dictionary_json_is_keyed_by_account() {
        let json = r#"{"alice": {"account": "alice", "nickname": "Al"}}"#;
        let dict: MentionDictionary = serde_json::from_str(json).unwrap();
        let alice = dict.get("alice").unwrap();
        assert_eq!(alice.nickname, "Al");
        assert!(alice.active, "active defaults to true");
    }

    #[test]
    fn test_candidate_cache_is_unique_by_account() {
        let mut cache = CandidateCache::new();
        cache.add(&UserRef::new("alice", "Al"));
        cache.add(&UserRef::new("alice", "Al"));
        assert_eq!(cache.len(), 1);
        assert!(cache.remove("alice").is_some());
        assert!(cache.is_empty());
    }
}
