//! Search Route - top-level grounded search

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use fera::{extract_sources, format_markdown, Source};

use crate::error::{method_not_allowed, ApiError};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Search response: the session to chain follow-ups onto, the formatted
/// summary (markdown), and the deduplicated sources.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub session_id: String,
    pub summary: String,
    pub sources: Vec<Source>,
}

/// Execute a grounded web search
#[utoipa::path(
    get,
    path = "/api/search",
    params(
        ("q" = String, Query, description = "Search query"),
    ),
    responses(
        (status = 200, description = "Grounded answer with sources", body = SearchResponse),
        (status = 400, description = "Missing query", body = crate::error::ErrorBody),
        (status = 500, description = "Provider failure", body = crate::error::ErrorBody),
    ),
    tag = "Search"
)]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.q.as_deref().map(str::trim).unwrap_or("");
    if query.is_empty() {
        return Err(ApiError::bad_request("Query parameter 'q' is required"));
    }

    let answer = state.agent.generate(&[], query).await?;

    let summary = format_markdown(&answer.text);
    let sources = answer
        .grounding
        .as_ref()
        .map(extract_sources)
        .unwrap_or_default();

    let session_id = state.sessions.lock().await.register(query);

    tracing::info!(
        "🔍 search: {:?} -> {} sources, session {}",
        query,
        sources.len(),
        session_id
    );

    Ok(Json(SearchResponse {
        session_id,
        summary,
        sources,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/search", get(search).fallback(method_not_allowed))
}
