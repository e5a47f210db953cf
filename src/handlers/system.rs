// ---------------------------------------------------------------------------
// handlers/system.rs — Health
// ---------------------------------------------------------------------------

use axum::Json;

use crate::models::{HealthResponse, SERVICE_NAME};

#[utoipa::path(get, path = "/health", tag = "health",
    responses((status = 200, description = "Liveness probe", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
