//! Liveness endpoint for deployment monitoring.

use axum::Json;
use chrono::Utc;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    status:    &'static str,
    timestamp: String,
}

/// GET /health — no auth, no database round-trip.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:    "healthy",
        timestamp: Utc::now().to_rfc3339(),
    })
}
