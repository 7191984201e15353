//! Health check endpoint

use std::sync::OnceLock;
use std::time::Instant;

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

/// Record service start time. Called once from main.
pub fn mark_started() {
    let _ = STARTED_AT.set(Instant::now());
}

/// Service status
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` when the service is up
    pub status: String,
    /// Service version (from Cargo.toml)
    pub version: String,
    /// Seconds since service start
    pub uptime_seconds: u64,
}

/// Service health check
///
/// Returns status, version and uptime. No authentication required;
/// intended for availability monitoring.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    let uptime_seconds = STARTED_AT
        .get()
        .map(|t| t.elapsed().as_secs())
        .unwrap_or(0);
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
    })
}
