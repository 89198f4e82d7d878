//! Fera API Client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use fera::{ConversationTurn, Source};

/// Client-side API errors. A follow-up 404 is its own variant so the flow
/// can fall back to a fresh search instead of surfacing it.
#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("Session expired")]
    SessionExpired,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

// ============================================
// API Response Types
// ============================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub session_id: String,
    pub summary: String,
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowUpResponse {
    pub summary: String,
    pub sources: Vec<Source>,
}

/// The two Fera endpoints, behind a trait so the flow is testable with a stub.
#[async_trait]
pub trait SearchApi {
    async fn search(&self, query: &str) -> Result<SearchResponse, ApiClientError>;

    async fn follow_up(
        &self,
        query: &str,
        history: &[ConversationTurn],
        session_id: Option<&str>,
    ) -> Result<FollowUpResponse, ApiClientError>;
}

/// HTTP client for the Fera API
pub struct FeraClient {
    client: Client,
    base_url: String,
}

impl FeraClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Test connection with health check
    pub async fn health(&self) -> Result<bool, ApiClientError> {
        let url = format!("{}/health", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| ApiClientError::Request(err.to_string()))?;
        Ok(resp.status().is_success())
    }
}

#[async_trait]
impl SearchApi for FeraClient {
    async fn search(&self, query: &str) -> Result<SearchResponse, ApiClientError> {
        let url = format!(
            "{}/api/search?q={}",
            self.base_url,
            urlencoding::encode(query)
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| ApiClientError::Request(err.to_string()))?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp, false).await);
        }

        resp.json()
            .await
            .map_err(|err| ApiClientError::Parse(err.to_string()))
    }

    async fn follow_up(
        &self,
        query: &str,
        history: &[ConversationTurn],
        session_id: Option<&str>,
    ) -> Result<FollowUpResponse, ApiClientError> {
        let url = format!("{}/api/follow-up", self.base_url);

        let body = serde_json::json!({
            "query": query,
            "conversationHistory": history,
            "sessionId": session_id,
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| ApiClientError::Request(err.to_string()))?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp, true).await);
        }

        resp.json()
            .await
            .map_err(|err| ApiClientError::Parse(err.to_string()))
    }
}

async fn error_from_response(resp: reqwest::Response, follow_up: bool) -> ApiClientError {
    let status = resp.status();
    if follow_up && status == StatusCode::NOT_FOUND {
        return ApiClientError::SessionExpired;
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or(body);

    ApiClientError::Api {
        status: status.as_u16(),
        message,
    }
}
