//! JSON body of every error response.

use serde::{Deserialize, Serialize};

/// Message used when an error carries none.
pub const DEFAULT_ERROR_MESSAGE: &str = "Server Error";

/// Message of the synthesized not-found error.
pub const NOT_FOUND_MESSAGE: &str = "The requested resource couldn't be found.";

/// Wire format of an error response.
///
/// ```json
/// { "message": "...", "statusCode": 404, "errors": ["..."], "stack": "..." }
/// ```
///
/// `stack` is omitted entirely when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub message: String,
    pub status_code: u16,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}
