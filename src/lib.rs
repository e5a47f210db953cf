pub mod config;
pub mod error;
pub mod handlers;
pub mod mcp;
pub mod models;
pub mod oauth;
pub mod state;
pub mod vertex;

use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "gemini-mcp",
        description = "MCP + REST gateway to Vertex AI Gemini",
        version = "2.0.0"
    ),
    paths(
        handlers::health,
        handlers::generate,
        handlers::chat,
        handlers::analyze,
        handlers::list_models,
    ),
    components(schemas(
        models::HealthResponse,
        models::ModelListing,
        models::GenerateParams,
        models::ChatParams,
        models::ChatMessage,
        models::AnalyzeParams,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "gemini", description = "Direct REST access to Gemini generation"),
    )
)]
pub struct ApiDoc;

/// Build the application router with the given state.
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a network port.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health))
        // MCP (JSON-RPC 2.0)
        .route("/mcp", get(mcp::server::mcp_info).post(mcp::server::mcp_handler))
        // REST facade
        .route("/generate", post(handlers::generate))
        .route("/chat", post(handlers::chat))
        .route("/analyze", post(handlers::analyze))
        .route("/models", get(handlers::list_models))
        // OpenAPI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Shared state
        .with_state(state)
}
