use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use fera::{GeminiAgent, GroundedSearch};

mod error;
mod routes;
mod sessions;

use sessions::SessionRegistry;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<dyn GroundedSearch>,
    pub sessions: Arc<Mutex<SessionRegistry>>,
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
}

async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Fera API is running - ask anything, get a grounded answer".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn app_router(state: AppState) -> Router {
    let openapi = routes::swagger::ApiDoc::openapi();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(routes::search::router())
        .merge(routes::follow_up::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fera_server=info,tower_http=info".into()),
        )
        .init();

    tracing::info!("🔍 Fera API initializing...");

    let api_key = std::env::var("GEMINI_API_KEY")
        .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY must be set"))?;

    let mut agent = GeminiAgent::new(api_key);
    if let Ok(model) = std::env::var("FERA_MODEL") {
        tracing::info!("🤖 Using Gemini model override: {}", model);
        agent = agent.with_model(model);
    }

    let state = AppState {
        agent: Arc::new(agent),
        sessions: Arc::new(Mutex::new(SessionRegistry::new())),
    };

    let router = app_router(state);

    let addr = std::env::var("FERA_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("📚 Swagger UI: /swagger-ui");
    tracing::info!("✅ Fera API ready on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
