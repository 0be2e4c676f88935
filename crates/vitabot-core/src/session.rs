//! In-memory session store: conversation history + counters keyed by an opaque id.
//!
//! Sessions are created lazily on first reference and live for the process
//! lifetime unless the idle sweep is enabled (`BOT_SESSION_TTL_MINUTES`).
//! DashMap gives per-key entry locking, so `record_question` and `append` are
//! indivisible check-and-set operations per session id. There is no
//! cross-request locking for a single id: clients are expected to keep one
//! request in flight per session.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Sessions touched less than this long ago count as "active" in stats.
const ACTIVE_WINDOW: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// One conversation turn, as stored in history and sent to providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }
}

#[derive(Debug)]
struct Session {
    messages: Vec<Turn>,
    last_activity: SystemTime,
    question_count: u64,
}

impl Session {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            last_activity: SystemTime::now(),
            question_count: 0,
        }
    }
}

/// Aggregate counters for `/api/stats`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_sessions: usize,
    pub active_sessions: usize,
    pub total_messages: usize,
}

/// Process-lifetime mapping from session id to conversation state.
///
/// The entire contract is `get_or_create` / `touch` / `append` plus the
/// `record_question` convenience that fuses create + touch + counter bump into
/// one entry lock.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self { sessions: DashMap::new() }
    }

    /// Creates the session with empty history if absent. One indivisible
    /// check-and-set per key.
    pub fn get_or_create(&self, id: &str) {
        self.sessions.entry(id.to_string()).or_insert_with(Session::new);
    }

    /// Updates `last_activity`; no-op for unknown ids.
    pub fn touch(&self, id: &str) {
        if let Some(mut s) = self.sessions.get_mut(id) {
            s.last_activity = SystemTime::now();
        }
    }

    /// Get-or-create, touch, and increment the question counter in one entry
    /// lock. Returns the new counter value.
    pub fn record_question(&self, id: &str) -> u64 {
        let mut entry = self.sessions.entry(id.to_string()).or_insert_with(Session::new);
        entry.last_activity = SystemTime::now();
        entry.question_count += 1;
        entry.question_count
    }

    /// Appends turns to the session history, preserving order. Creates the
    /// session if it does not exist yet.
    pub fn append(&self, id: &str, turns: Vec<Turn>) {
        let mut entry = self.sessions.entry(id.to_string()).or_insert_with(Session::new);
        entry.messages.extend(turns);
    }

    /// Clone of the most recent `max_turns` turns, oldest first.
    pub fn history(&self, id: &str, max_turns: usize) -> Vec<Turn> {
        match self.sessions.get(id) {
            Some(s) => {
                let skip = s.messages.len().saturating_sub(max_turns);
                s.messages[skip..].to_vec()
            }
            None => Vec::new(),
        }
    }

    pub fn message_count(&self, id: &str) -> usize {
        self.sessions.get(id).map(|s| s.messages.len()).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        let now = SystemTime::now();
        let mut active = 0usize;
        let mut messages = 0usize;
        for s in self.sessions.iter() {
            messages += s.messages.len();
            let idle = now.duration_since(s.last_activity).unwrap_or(Duration::ZERO);
            if idle < ACTIVE_WINDOW {
                active += 1;
            }
        }
        StoreStats {
            total_sessions: self.sessions.len(),
            active_sessions: active,
            total_messages: messages,
        }
    }

    /// Removes sessions idle longer than `ttl`. Returns the number evicted.
    pub fn sweep_idle(&self, ttl: Duration) -> usize {
        let now = SystemTime::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| {
            now.duration_since(s.last_activity).unwrap_or(Duration::ZERO) < ttl
        });
        before - self.sessions.len()
    }

    /// Test hook: back-dates a session's `last_activity`.
    #[cfg(test)]
    fn set_last_activity(&self, id: &str, t: SystemTime) {
        if let Some(mut s) = self.sessions.get_mut(id) {
            s.last_activity = t;
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Server-generated session id: `session_<epoch-millis>_<random>`.
pub fn new_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let random: String = uuid::Uuid::new_v4().simple().to_string().chars().take(13).collect();
    format!("session_{}_{}", millis, random)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_is_lazy_and_idempotent() {
        let store = SessionStore::new();
        assert!(store.is_empty());
        store.get_or_create("s1");
        store.get_or_create("s1");
        assert_eq!(store.len(), 1);
        assert_eq!(store.message_count("s1"), 0);
    }

    #[test]
    fn test_append_preserves_order_and_grows_by_two_per_turn() {
        let store = SessionStore::new();
        for i in 0..3 {
            store.append(
                "s1",
                vec![Turn::user(format!("q{}", i)), Turn::assistant(format!("a{}", i))],
            );
            assert_eq!(store.message_count("s1"), (i + 1) * 2);
        }
        let history = store.history("s1", 100);
        assert_eq!(history[0].content, "q0");
        assert_eq!(history[1].content, "a0");
        assert_eq!(history[5].content, "a2");
    }

    #[test]
    fn test_record_question_increments_per_inbound_message() {
        let store = SessionStore::new();
        assert_eq!(store.record_question("s1"), 1);
        assert_eq!(store.record_question("s1"), 2);
        assert_eq!(store.record_question("s2"), 1);
    }

    #[test]
    fn test_history_caps_to_most_recent_turns() {
        let store = SessionStore::new();
        for i in 0..12 {
            store.append("s1", vec![Turn::user(format!("m{}", i))]);
        }
        let history = store.history("s1", 10);
        assert_eq!(history.len(), 10);
        assert_eq!(history[0].content, "m2");
        assert_eq!(history[9].content, "m11");
    }

    #[test]
    fn test_stats_counts_messages_and_excludes_stale_sessions() {
        let store = SessionStore::new();
        store.append("fresh", vec![Turn::user("hi"), Turn::assistant("hello")]);
        store.append("stale", vec![Turn::user("old")]);
        store.set_last_activity("stale", SystemTime::now() - Duration::from_secs(31 * 60));

        let stats = store.stats();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.active_sessions, 1);
        assert_eq!(stats.total_messages, 3);
    }

    #[test]
    fn test_sweep_idle_evicts_only_stale_sessions() {
        let store = SessionStore::new();
        store.get_or_create("fresh");
        store.get_or_create("stale");
        store.set_last_activity("stale", SystemTime::now() - Duration::from_secs(3600));

        let evicted = store.sweep_idle(Duration::from_secs(1800));
        assert_eq!(evicted, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.message_count("fresh"), 0);
    }

    #[test]
    fn test_new_session_id_shape() {
        let id = new_session_id();
        assert!(id.starts_with("session_"));
        assert_eq!(id.split('_').count(), 3);
        assert_ne!(new_session_id(), id);
    }
}
