//! Search flow state machine
//!
//! Coordinates top-level searches, follow-up chaining onto the current
//! session, and the silent fallback to a fresh search when the server no
//! longer knows the session (a redeploy clears its registry). Re-submitting
//! the identical top-level query bumps a monotonic refetch counter and
//! always refetches instead of reusing the shown result.

use anyhow::Result;

use fera::Source;

use crate::api::{ApiClientError, SearchApi, SearchResponse};
use crate::store::HistoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Searching,
    ShowingResult,
    FollowingUp,
}

/// What the UI displays after an exchange completes.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub query: String,
    pub summary: String,
    pub sources: Vec<Source>,
    pub is_follow_up: bool,
}

pub struct SearchFlow<A: SearchApi> {
    api: A,
    state: FlowState,
    local_session_id: Option<String>,
    server_session_id: Option<String>,
    original_query: Option<String>,
    last_query: Option<String>,
    refetch_counter: u64,
    current: Option<SearchOutcome>,
}

impl<A: SearchApi> SearchFlow<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: FlowState::Idle,
            local_session_id: None,
            server_session_id: None,
            original_query: None,
            last_query: None,
            refetch_counter: 0,
            current: None,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn session_id(&self) -> Option<&str> {
        self.local_session_id.as_deref()
    }

    pub fn original_query(&self) -> Option<&str> {
        self.original_query.as_deref()
    }

    pub fn refetch_counter(&self) -> u64 {
        self.refetch_counter
    }

    pub fn current(&self) -> Option<&SearchOutcome> {
        self.current.as_ref()
    }

    /// Top-level search. A new query clears the session binding and the
    /// original-query anchor; the identical query forces a refetch.
    pub async fn search(&mut self, store: &mut HistoryStore, query: &str) -> Result<SearchOutcome> {
        if self.last_query.as_deref() == Some(query) {
            self.refetch_counter += 1;
        } else {
            self.local_session_id = None;
            self.server_session_id = None;
            self.original_query = None;
            self.last_query = Some(query.to_string());
        }

        self.state = FlowState::Searching;
        match self.api.search(query).await {
            Ok(response) => self.accept_search(store, query, response),
            Err(err) => {
                self.settle();
                Err(err.into())
            }
        }
    }

    /// Follow-up chained onto the current session. Without a session this
    /// degrades to a fresh search. A server-side "session not found" is
    /// absorbed by transparently starting a new session.
    pub async fn follow_up(
        &mut self,
        store: &mut HistoryStore,
        query: &str,
    ) -> Result<SearchOutcome> {
        let Some(local_id) = self.local_session_id.clone() else {
            self.state = FlowState::Searching;
            return match self.api.search(query).await {
                Ok(response) => self.accept_search(store, query, response),
                Err(err) => {
                    self.settle();
                    Err(err.into())
                }
            };
        };

        self.state = FlowState::FollowingUp;
        let turns = store.history().conversation_turns(&local_id);

        match self
            .api
            .follow_up(query, &turns, self.server_session_id.as_deref())
            .await
        {
            Ok(response) => {
                store.add_to_session(&local_id, query, &response.summary, response.sources.clone())?;
                let outcome = SearchOutcome {
                    query: query.to_string(),
                    summary: response.summary,
                    sources: response.sources,
                    is_follow_up: true,
                };
                self.current = Some(outcome.clone());
                self.state = FlowState::ShowingResult;
                Ok(outcome)
            }
            Err(ApiClientError::SessionExpired) => {
                // Server forgot the session; start over without surfacing it.
                match self.api.search(query).await {
                    Ok(response) => {
                        self.local_session_id = None;
                        self.server_session_id = None;
                        self.original_query = None;
                        self.last_query = Some(query.to_string());
                        self.accept_search(store, query, response)
                    }
                    Err(err) => {
                        self.settle();
                        Err(err.into())
                    }
                }
            }
            Err(err) => {
                self.settle();
                Err(err.into())
            }
        }
    }

    fn accept_search(
        &mut self,
        store: &mut HistoryStore,
        query: &str,
        response: SearchResponse,
    ) -> Result<SearchOutcome> {
        let local_id = store.create_session(query, &response.summary, response.sources.clone())?;
        self.local_session_id = Some(local_id);
        self.server_session_id = Some(response.session_id);
        if self.original_query.is_none() {
            self.original_query = Some(query.to_string());
        }

        let outcome = SearchOutcome {
            query: query.to_string(),
            summary: response.summary,
            sources: response.sources,
            is_follow_up: false,
        };
        self.current = Some(outcome.clone());
        self.state = FlowState::ShowingResult;
        Ok(outcome)
    }

    fn settle(&mut self) {
        self.state = if self.current.is_some() {
            FlowState::ShowingResult
        } else {
            FlowState::Idle
        };
    }
}
