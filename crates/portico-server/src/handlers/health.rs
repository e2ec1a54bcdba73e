//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
}

/// Body de GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
}

impl HealthResponse {
    pub fn up() -> Self {
        Self {
            status: HealthStatus::Up,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::up())
}
