//! Follow-up Route - continue a search conversation

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use fera::{extract_sources, format_html, ConversationTurn, Source};

use crate::error::{method_not_allowed, ApiError};
use crate::AppState;

/// Follow-up request: the new query plus the accumulated conversation.
/// `sessionId` is optional; when present it must still be registered, so
/// clients can detect expiry (a redeploy clears the registry) and fall back
/// to a fresh search.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Follow-up response: the formatted summary (HTML) and its sources.
#[derive(Debug, Serialize, ToSchema)]
pub struct FollowUpResponse {
    pub summary: String,
    pub sources: Vec<Source>,
}

/// Continue a conversation with a follow-up query
#[utoipa::path(
    post,
    path = "/api/follow-up",
    request_body = FollowUpRequest,
    responses(
        (status = 200, description = "Grounded answer with sources", body = FollowUpResponse),
        (status = 400, description = "Missing query", body = crate::error::ErrorBody),
        (status = 404, description = "Session expired", body = crate::error::ErrorBody),
        (status = 500, description = "Provider failure", body = crate::error::ErrorBody),
    ),
    tag = "Search"
)]
pub async fn follow_up(
    State(state): State<AppState>,
    Json(payload): Json<FollowUpRequest>,
) -> Result<Json<FollowUpResponse>, ApiError> {
    let query = payload.query.trim();
    if query.is_empty() {
        return Err(ApiError::bad_request("Query is required"));
    }

    if let Some(session_id) = payload.session_id.as_deref() {
        if !state.sessions.lock().await.contains(session_id) {
            tracing::warn!("follow-up for expired session {}", session_id);
            return Err(ApiError::not_found("Session not found"));
        }
    }

    let answer = state
        .agent
        .generate(&payload.conversation_history, query)
        .await?;

    let summary = format_html(&answer.text);
    let sources = answer
        .grounding
        .as_ref()
        .map(extract_sources)
        .unwrap_or_default();

    tracing::info!(
        "💬 follow-up: {:?} ({} prior turns) -> {} sources",
        query,
        payload.conversation_history.len(),
        sources.len()
    );

    Ok(Json(FollowUpResponse { summary, sources }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/follow-up", post(follow_up).fallback(method_not_allowed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{grounded_state, plain_state, recording_state};

    fn request(query: &str, session_id: Option<String>) -> FollowUpRequest {
        FollowUpRequest {
            query: query.to_string(),
            conversation_history: vec![ConversationTurn {
                query: "capital of France".to_string(),
                response: "Paris.".to_string(),
            }],
            session_id,
        }
    }

    #[tokio::test]
    async fn test_missing_query_is_bad_request() {
        let result = follow_up(State(plain_state("x")), Json(request("", None))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let result = follow_up(
            State(plain_state("x")),
            Json(request("and its population?", Some("expired1".to_string()))),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_registered_session_is_accepted() {
        let state = plain_state("About 2.1 million.");
        let id = state.sessions.lock().await.register("capital of France");

        let Json(response) = follow_up(State(state), Json(request("population?", Some(id))))
            .await
            .unwrap();
        assert!(response.summary.contains("2.1 million"));
    }

    #[tokio::test]
    async fn test_history_is_forwarded_to_provider() {
        let (state, seen) = recording_state("Indeed.");

        follow_up(State(state), Json(request("why?", None)))
            .await
            .unwrap();

        let history = seen.lock().await.clone();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].query, "capital of France");
        assert_eq!(history[0].response, "Paris.");
    }

    #[tokio::test]
    async fn test_summary_is_html_and_sources_deduped() {
        let state = grounded_state(
            "Details:\nIt has been the capital since 987.",
            vec![
                ("History", "https://a.example"),
                ("History again", "https://a.example"),
            ],
        );

        let Json(response) = follow_up(State(state), Json(request("since when?", None)))
            .await
            .unwrap();

        assert!(response.summary.contains("<h2>Details</h2>"));
        assert_eq!(response.sources.len(), 1);
    }
}
