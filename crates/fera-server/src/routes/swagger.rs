//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use fera::{ConversationTurn, Source};

use crate::error::ErrorBody;

use super::follow_up::{FollowUpRequest, FollowUpResponse};
use super::search::SearchResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::search::search,
        super::follow_up::follow_up,
    ),
    info(
        title = "Fera API",
        version = "0.1.0",
        description = "Grounded web search: ask anything, get an AI summary with sources.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Search", description = "Grounded search and follow-up conversations"),
    ),
    components(
        schemas(
            SearchResponse,
            FollowUpRequest,
            FollowUpResponse,
            ConversationTurn,
            Source,
            ErrorBody,
        )
    ),
)]
pub struct ApiDoc;
