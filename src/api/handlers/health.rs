//! Liveness probe handler.

use axum::Json;

use crate::api::dto::health::HealthResponse;

/// # Endpoint
///
/// `GET /healthz`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
