//! Search sessions and the bounded session history
//!
//! A session is one original query plus the follow-up turns chained onto it.
//! The history keeps sessions newest-first, capped at [`MAX_SESSIONS`], and
//! is persisted client-side as a single serialized blob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::Source;
use crate::ports::ConversationTurn;

/// Maximum number of sessions retained in the history; oldest evicted first.
pub const MAX_SESSIONS: usize = 50;

/// One completed query/response exchange. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub query: String,
    pub response: String,
    pub sources: Vec<Source>,
    pub timestamp: DateTime<Utc>,
}

/// A thread of one original query plus its follow-ups. Conversations are
/// append-only and time-ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSession {
    pub id: String,
    pub original_query: String,
    pub conversations: Vec<ConversationEntry>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl SearchSession {
    /// Create a session seeded with its first exchange.
    pub fn new(query: impl Into<String>, response: impl Into<String>, sources: Vec<Source>) -> Self {
        let query = query.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            original_query: query.clone(),
            conversations: vec![ConversationEntry {
                query,
                response: response.into(),
                sources,
                timestamp: now,
            }],
            created_at: now,
            last_updated: now,
        }
    }

    /// Append a follow-up exchange.
    pub fn append(&mut self, query: impl Into<String>, response: impl Into<String>, sources: Vec<Source>) {
        let now = Utc::now();
        self.conversations.push(ConversationEntry {
            query: query.into(),
            response: response.into(),
            sources,
            timestamp: now,
        });
        self.last_updated = now;
    }

    /// The `{query, response}` turns sent as context to the follow-up endpoint.
    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.conversations
            .iter()
            .map(|entry| ConversationTurn {
                query: entry.query.clone(),
                response: entry.response.clone(),
            })
            .collect()
    }
}

/// The full client-side history: sessions newest-first plus an optional
/// pointer to the session currently being extended.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistory {
    #[serde(default)]
    pub sessions: Vec<SearchSession>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_session_id: Option<String>,
}

impl SearchHistory {
    /// Create a new session from a first exchange, make it current, and
    /// evict the oldest sessions beyond the cap. Returns the new session id.
    pub fn create_session(
        &mut self,
        query: impl Into<String>,
        response: impl Into<String>,
        sources: Vec<Source>,
    ) -> String {
        let session = SearchSession::new(query, response, sources);
        let id = session.id.clone();
        self.sessions.insert(0, session);
        self.sessions.truncate(MAX_SESSIONS);
        self.current_session_id = Some(id.clone());
        id
    }

    /// Append a follow-up exchange to an existing session. Returns false if
    /// the session is unknown (evicted or deleted).
    pub fn add_to_session(
        &mut self,
        session_id: &str,
        query: impl Into<String>,
        response: impl Into<String>,
        sources: Vec<Source>,
    ) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == session_id) {
            Some(session) => {
                session.append(query, response, sources);
                true
            }
            None => false,
        }
    }

    pub fn get_session(&self, session_id: &str) -> Option<&SearchSession> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    pub fn current_session(&self) -> Option<&SearchSession> {
        self.current_session_id
            .as_deref()
            .and_then(|id| self.get_session(id))
    }

    /// Point the history at an existing session, or clear the pointer.
    /// A pointer to an unknown session is rejected (cleared instead).
    pub fn set_current_session(&mut self, session_id: Option<String>) {
        self.current_session_id = session_id.filter(|id| self.get_session(id).is_some());
    }

    /// Delete a session. Clears the current pointer if it referenced it.
    pub fn delete_session(&mut self, session_id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != session_id);
        if self.current_session_id.as_deref() == Some(session_id) {
            self.current_session_id = None;
        }
        self.sessions.len() != before
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
        self.current_session_id = None;
    }

    /// Conversation turns for a session, for the follow-up request body.
    /// Unknown session yields an empty list.
    pub fn conversation_turns(&self, session_id: &str) -> Vec<ConversationTurn> {
        self.get_session(session_id)
            .map(|s| s.turns())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(url: &str) -> Source {
        Source {
            title: "t".to_string(),
            url: url.to_string(),
            snippet: String::new(),
        }
    }

    #[test]
    fn test_create_session_becomes_current() {
        let mut history = SearchHistory::default();
        let id = history.create_session("capital of France", "Paris.", vec![source("https://a")]);
        assert_eq!(history.sessions.len(), 1);
        assert_eq!(history.current_session_id.as_deref(), Some(id.as_str()));
        assert_eq!(history.sessions[0].original_query, "capital of France");
        assert_eq!(history.sessions[0].conversations.len(), 1);
    }

    #[test]
    fn test_session_ids_are_unique() {
        let mut history = SearchHistory::default();
        let a = history.create_session("q1", "r1", vec![]);
        let b = history.create_session("q2", "r2", vec![]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_newest_session_first() {
        let mut history = SearchHistory::default();
        history.create_session("first", "r", vec![]);
        history.create_session("second", "r", vec![]);
        assert_eq!(history.sessions[0].original_query, "second");
        assert_eq!(history.sessions[1].original_query, "first");
    }

    #[test]
    fn test_cap_evicts_oldest_first() {
        let mut history = SearchHistory::default();
        for i in 0..MAX_SESSIONS + 5 {
            history.create_session(format!("query {}", i), "r", vec![]);
        }
        assert_eq!(history.sessions.len(), MAX_SESSIONS);
        // Newest survives, the five oldest are gone
        assert_eq!(history.sessions[0].original_query, format!("query {}", MAX_SESSIONS + 4));
        assert_eq!(
            history.sessions.last().unwrap().original_query,
            "query 5"
        );
    }

    #[test]
    fn test_follow_up_appends_and_bumps_last_updated() {
        let mut history = SearchHistory::default();
        let id = history.create_session("q", "r", vec![]);
        let created = history.get_session(&id).unwrap().created_at;

        assert!(history.add_to_session(&id, "more?", "indeed", vec![]));
        let session = history.get_session(&id).unwrap();
        assert_eq!(session.conversations.len(), 2);
        assert_eq!(session.conversations[1].query, "more?");
        assert!(session.last_updated >= created);
    }

    #[test]
    fn test_add_to_unknown_session_is_noop() {
        let mut history = SearchHistory::default();
        history.create_session("q", "r", vec![]);
        assert!(!history.add_to_session("missing", "x", "y", vec![]));
        assert_eq!(history.sessions[0].conversations.len(), 1);
    }

    #[test]
    fn test_delete_clears_current_pointer() {
        let mut history = SearchHistory::default();
        let id = history.create_session("q", "r", vec![]);
        assert!(history.delete_session(&id));
        assert!(history.sessions.is_empty());
        assert!(history.current_session_id.is_none());
    }

    #[test]
    fn test_delete_other_session_keeps_pointer() {
        let mut history = SearchHistory::default();
        let old = history.create_session("old", "r", vec![]);
        let current = history.create_session("new", "r", vec![]);
        assert!(history.delete_session(&old));
        assert_eq!(history.current_session_id.as_deref(), Some(current.as_str()));
    }

    #[test]
    fn test_set_current_rejects_unknown_id() {
        let mut history = SearchHistory::default();
        history.create_session("q", "r", vec![]);
        history.set_current_session(Some("missing".to_string()));
        assert!(history.current_session_id.is_none());
    }

    #[test]
    fn test_conversation_turns_strip_sources() {
        let mut history = SearchHistory::default();
        let id = history.create_session("q", "r", vec![source("https://a")]);
        history.add_to_session(&id, "q2", "r2", vec![]);

        let turns = history.conversation_turns(&id);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].query, "q");
        assert_eq!(turns[0].response, "r");
        assert_eq!(turns[1].query, "q2");
        assert!(history.conversation_turns("missing").is_empty());
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut history = SearchHistory::default();
        history.create_session("q", "r", vec![]);
        history.clear();
        assert!(history.sessions.is_empty());
        assert!(history.current_session_id.is_none());
    }
}
