//! Default route table.

use axum::{Router, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::handlers::{csrf::restore_csrf, health::health_check, metrics::metrics_handler};

/// Routes every deployment serves.
pub fn api_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/csrf/restore", get(restore_csrf))
}

/// Prometheus scrape endpoint.
pub fn metrics_routes(prometheus: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus)
}
