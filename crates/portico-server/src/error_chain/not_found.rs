//! Route fall-through and 404 synthesis.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::{AppError, HttpError};

/// Marks a response produced because no route handled the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteUnmatched;

/// Router fallback: leaves the request unhandled for the error chain.
pub async fn fall_through() -> Response {
    let mut response = StatusCode::NOT_FOUND.into_response();
    response.extensions_mut().insert(RouteUnmatched);
    response
}

/// Creates the not-found error when nothing else failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundSynthesizer;

impl NotFoundSynthesizer {
    /// Returns the existing error, or a new 404 when there is none.
    pub fn resolve(&self, existing: Option<HttpError>) -> HttpError {
        existing.unwrap_or_else(|| HttpError::from(AppError::NotFound))
    }
}
