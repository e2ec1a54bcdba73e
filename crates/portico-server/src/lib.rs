//! Portico Server - HTTP front door for the application
//!
//! Wraps a route table in the request pipeline (logging, cookie and JSON
//! parsing, security headers, CORS, CSRF) and renders every failure through
//! the error chain as a JSON envelope.
//!
//! # Example
//!
//! ```no_run
//! use axum::{Router, routing::post};
//! use portico_core::ValidationError;
//! use portico_server::{AppError, ServerConfig, create_router_with_routes, routes::api_routes};
//!
//! async fn signup() -> Result<&'static str, AppError> {
//!     Err(ValidationError::from_messages(["email required"]).into())
//! }
//!
//! let config = ServerConfig::for_environment("development");
//! let app: Router = create_router_with_routes(
//!     &config,
//!     api_routes().route("/api/users", post(signup)),
//! );
//! ```

pub mod config;
pub mod error;
pub mod error_chain;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod pipeline;
pub mod routes;
mod server;

pub use config::{ConfigError, ServerConfig};
pub use error::{AppError, HttpError, ParseErrorKind, StatusError};
pub use handlers::health::HealthResponse;
pub use pipeline::{Pipeline, Stage};
pub use server::{ServerError, create_router, create_router_with_routes, run_server};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
