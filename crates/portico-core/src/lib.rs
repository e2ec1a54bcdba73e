//! Portico Core - Domain types for the Portico request pipeline
//!
//! This crate holds everything the pipeline needs that does not depend on the
//! HTTP framework: the environment flag, cookie decoding, CSRF token
//! primitives, the data-layer validation failure and the error envelope.

pub mod cookie;
pub mod csrf;
pub mod envelope;
pub mod environment;
pub mod error;
pub mod validation;

pub use cookie::CookieMap;
pub use csrf::CsrfTokens;
pub use envelope::{DEFAULT_ERROR_MESSAGE, ErrorEnvelope, NOT_FOUND_MESSAGE};
pub use environment::Environment;
pub use error::{CoreError, Result};
pub use validation::{ValidationError, ValidationErrorItem};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
