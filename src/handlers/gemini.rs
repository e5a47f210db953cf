// ---------------------------------------------------------------------------
// handlers/gemini.rs — REST facade over the Vertex client (no MCP envelope)
// ---------------------------------------------------------------------------
//
// Every endpoint answers 200. Callers branch on `success`, not on status.

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::models::{AnalyzeParams, ChatParams, GenerateParams, ModelListing, UpstreamResult};
use crate::state::AppState;

#[utoipa::path(post, path = "/generate", tag = "gemini",
    request_body = GenerateParams,
    responses((status = 200, description = "`{success, text, model}` or `{success: false, error}`", body = Value))
)]
pub async fn generate(State(state): State<AppState>, Json(params): Json<GenerateParams>) -> Json<UpstreamResult> {
    let result = match params.validate(&state.config) {
        Ok(req) => state.vertex.generate(&req).await,
        Err(e) => {
            tracing::warn!("POST /generate rejected: {}", e);
            e.into()
        }
    };
    Json(result)
}

#[utoipa::path(post, path = "/chat", tag = "gemini",
    request_body = ChatParams,
    responses((status = 200, description = "`{success, text, model}` or `{success: false, error}`", body = Value))
)]
pub async fn chat(State(state): State<AppState>, Json(params): Json<ChatParams>) -> Json<UpstreamResult> {
    let result = match params.validate(&state.config) {
        Ok(req) => state.vertex.chat(&req).await,
        Err(e) => {
            tracing::warn!("POST /chat rejected: {}", e);
            e.into()
        }
    };
    Json(result)
}

#[utoipa::path(post, path = "/analyze", tag = "gemini",
    request_body = AnalyzeParams,
    responses((status = 200, description = "`{success, text, model}` or `{success: false, error}`", body = Value))
)]
pub async fn analyze(State(state): State<AppState>, Json(params): Json<AnalyzeParams>) -> Json<UpstreamResult> {
    let result = match params.validate(&state.config) {
        Ok(req) => state.vertex.generate(&req).await,
        Err(e) => {
            tracing::warn!("POST /analyze rejected: {}", e);
            e.into()
        }
    };
    Json(result)
}

#[utoipa::path(get, path = "/models", tag = "gemini",
    responses((status = 200, description = "Model allow-list and default", body = ModelListing))
)]
pub async fn list_models(State(state): State<AppState>) -> Json<ModelListing> {
    Json(ModelListing::from(&state.config.catalog))
}
