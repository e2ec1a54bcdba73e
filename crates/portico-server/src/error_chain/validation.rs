//! Normalization of data-layer validation failures.

use axum::http::StatusCode;

use crate::error::HttpError;

/// Enriches an error before it is formatted.
///
/// Normalizers only see the single error of the request and can only change
/// its title, status and error list.
pub trait ErrorNormalizer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn normalize(&self, error: &mut HttpError);
}

/// Turns a validation failure into a 400 listing each field message.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationNormalizer;

impl ErrorNormalizer for ValidationNormalizer {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn normalize(&self, error: &mut HttpError) {
        let Some(messages) = error.origin().as_validation().map(|v| {
            v.errors()
                .iter()
                .map(|item| item.message.clone())
                .collect::<Vec<_>>()
        }) else {
            return;
        };

        error.set_errors(messages);
        error.set_title("Validation Error");
        error.set_status(StatusCode::BAD_REQUEST.as_u16());
    }
}
