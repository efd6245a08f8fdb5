use axum::Json;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::helpers::to_iso_millis;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "OK" while the process is serving requests
    pub status: String,
    pub message: String,
    /// API version
    pub version: String,
    /// Server time (ISO 8601 UTC)
    pub timestamp: String,
}

/// Liveness probe.
///
/// Does not touch the upstream provider, so it stays 200 even when the
/// API key is missing or OpenWeatherMap is down.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse),
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Weather API Backend is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: to_iso_millis(Utc::now()),
    })
}
