//! Terminal error formatter.

use axum::{
    Json,
    http::{header, response::Parts},
    response::{IntoResponse, Response},
};
use portico_core::{Environment, ErrorEnvelope};
use tracing::{error, warn};

use crate::error::HttpError;

/// Writes the JSON envelope. Always the last error stage.
#[derive(Debug, Clone, Copy)]
pub struct ErrorFormatter {
    expose_stack: bool,
}

impl ErrorFormatter {
    /// Stacks are exposed everywhere except production.
    pub fn for_environment(environment: &Environment) -> Self {
        Self {
            expose_stack: !environment.is_production(),
        }
    }

    /// Builds the envelope for an error.
    pub fn envelope(&self, error: &HttpError) -> ErrorEnvelope {
        ErrorEnvelope {
            message: error.display_message().to_string(),
            status_code: error.status_code().as_u16(),
            errors: error.errors().map(<[String]>::to_vec).unwrap_or_default(),
            stack: self.expose_stack.then(|| error.stack()),
        }
    }

    /// Renders the error as the response.
    ///
    /// Headers already set by earlier stages are kept; the body and its
    /// content headers are replaced.
    pub fn format(&self, error: HttpError, mut parts: Parts) -> Response {
        let status = error.status_code();

        if status.is_server_error() {
            error!(
                status = status.as_u16(),
                title = error.title().unwrap_or("-"),
                error = %error.origin(),
                "Request failed"
            );
        } else {
            warn!(
                status = status.as_u16(),
                title = error.title().unwrap_or("-"),
                error = %error.origin(),
                "Request rejected"
            );
        }

        let mut response = (status, Json(self.envelope(&error))).into_response();

        parts.headers.remove(header::CONTENT_TYPE);
        parts.headers.remove(header::CONTENT_LENGTH);
        for (name, value) in parts.headers.iter() {
            response.headers_mut().append(name.clone(), value.clone());
        }

        response
    }
}
