//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
}

/// GET /health: liveness check naming the service.
pub async fn check(State(service): State<String>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service,
    })
}
