//! In-memory session registry
//!
//! Mirrors the client-visible `sessionId` contract: every successful search
//! registers a short id, the registry is capped and evicts oldest-first, and
//! the whole thing resets on redeploy. Clients must treat a missing session
//! as expired and fall back to a fresh search.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Maximum retained server-side sessions; oldest dropped on overflow.
pub const MAX_SERVER_SESSIONS: usize = 100;

#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: String,
    pub original_query: String,
    pub created_at: DateTime<Utc>,
}

/// Insertion-ordered bounded registry of active search sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: VecDeque<SessionRecord>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session for a query and return its id.
    pub fn register(&mut self, original_query: &str) -> String {
        let id = short_id();
        self.sessions.push_back(SessionRecord {
            id: id.clone(),
            original_query: original_query.to_string(),
            created_at: Utc::now(),
        });
        while self.sessions.len() > MAX_SERVER_SESSIONS {
            self.sessions.pop_front();
        }
        id
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.iter().any(|record| record.id == session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = SessionRegistry::new();
        let id = registry.register("capital of France");
        assert!(registry.contains(&id));
        assert!(!registry.contains("unknown"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut registry = SessionRegistry::new();
        let a = registry.register("q");
        let b = registry.register("q");
        assert_ne!(a, b);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut registry = SessionRegistry::new();
        let first = registry.register("first");
        for i in 0..MAX_SERVER_SESSIONS {
            registry.register(&format!("query {}", i));
        }
        assert_eq!(registry.len(), MAX_SERVER_SESSIONS);
        assert!(!registry.contains(&first));
    }
}
