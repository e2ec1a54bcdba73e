//! Error chain.
//!
//! Runs after every stage and route of a request. When the response carries
//! an [`HttpError`] or was marked [`RouteUnmatched`], the chain runs in order:
//!
//! 1. [`NotFoundSynthesizer`]: creates the 404 when nothing failed but no route matched
//! 2. normalizers, e.g. [`ValidationNormalizer`]
//! 3. [`ErrorFormatter`]: writes the JSON envelope
//!
//! Any other response passes through untouched.

mod formatter;
mod not_found;
mod validation;

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::response::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use portico_core::Environment;

use crate::error::{AppError, HttpError};

pub use formatter::ErrorFormatter;
pub use not_found::{NotFoundSynthesizer, RouteUnmatched, fall_through};
pub use validation::{ErrorNormalizer, ValidationNormalizer};

/// The ordered error stages, assembled once at startup.
pub struct ErrorChain {
    not_found: NotFoundSynthesizer,
    normalizers: Vec<Box<dyn ErrorNormalizer>>,
    formatter: ErrorFormatter,
}

impl ErrorChain {
    /// The default chain: 404 synthesis, validation normalization, JSON formatter.
    pub fn standard(environment: &Environment) -> Self {
        Self {
            not_found: NotFoundSynthesizer,
            normalizers: vec![Box::new(ValidationNormalizer)],
            formatter: ErrorFormatter::for_environment(environment),
        }
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        let mut names = vec!["not_found"];
        names.extend(self.normalizers.iter().map(|n| n.name()));
        names.push("formatter");
        names
    }

    /// Runs the chain for one failed request.
    pub fn resolve(&self, error: Option<HttpError>, parts: Parts) -> Response {
        let mut error = self.not_found.resolve(error);

        for normalizer in &self.normalizers {
            normalizer.normalize(&mut error);
        }

        self.formatter.format(error, parts)
    }
}

impl std::fmt::Debug for ErrorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorChain")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Middleware that hands failed responses to the error chain.
pub async fn handle_errors(
    State(chain): State<Arc<ErrorChain>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let error = response.extensions_mut().remove::<HttpError>();
    let unmatched = response.extensions_mut().remove::<RouteUnmatched>().is_some();

    if error.is_none() && !unmatched {
        return response;
    }

    let (parts, _body) = response.into_parts();
    chain.resolve(error, parts)
}

/// Turns a handler panic into an unhandled error for the chain.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "handler panicked".to_string()
    };

    AppError::unhandled(detail).into_response()
}
