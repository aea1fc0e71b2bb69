//! Health check endpoint

use axum::Json;

use crate::schemas::HealthResponse;

/// GET /health
///
/// Reports liveness only. It never touches the upstream provider, so it
/// stays green while Gemini is down.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
