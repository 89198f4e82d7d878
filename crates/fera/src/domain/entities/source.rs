//! Source - A web citation backing part of a response

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A cited web source, deduplicated by `url` within a single response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Source {
    /// Page title as reported by the grounding metadata
    pub title: String,
    /// Canonical URL of the source
    pub url: String,
    /// Best-effort excerpt of the answer text this source supports
    pub snippet: String,
}
