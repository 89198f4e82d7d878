//! Grounded Search Port
//!
//! Abstract interface for the web-grounded generation provider. Handlers
//! depend on this trait rather than the concrete Gemini agent so tests can
//! substitute a stub.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::errors::DomainError;

/// One prior query/response pair, sent as chat context for follow-ups.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationTurn {
    pub query: String,
    pub response: String,
}

/// Raw provider output: the generated text plus the grounding metadata of
/// the first candidate, when the provider returned any.
#[derive(Debug, Clone)]
pub struct GroundedAnswer {
    pub text: String,
    pub grounding: Option<serde_json::Value>,
}

/// Provider interface for web-grounded generation.
///
/// A single best-effort call per request: no retry, no timeout.
#[async_trait]
pub trait GroundedSearch: Send + Sync {
    /// Generate an answer for `query`, seeded with the prior `history` turns.
    async fn generate(
        &self,
        history: &[ConversationTurn],
        query: &str,
    ) -> Result<GroundedAnswer, DomainError>;
}
