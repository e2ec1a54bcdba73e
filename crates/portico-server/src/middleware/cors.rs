//! CORS stage.
//!
//! Only installed outside production. In production the stage is left out
//! of the pipeline, so browsers fall back to the same-origin policy.

use axum::http::Method;
use tower_http::cors::{AllowHeaders, Any, CorsLayer};

/// Allows any origin, mirroring requested headers.
pub fn permissive_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request())
}
