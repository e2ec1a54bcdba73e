//! CSRF bootstrap endpoint.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::middleware::csrf::{CsrfToken, append_cookie};

/// Cookie read by browser clients to echo the token back.
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

#[derive(Debug, Serialize)]
pub struct CsrfRestoreResponse {
    #[serde(rename = "XSRF-Token")]
    pub token: String,
}

/// Handler for GET /api/csrf/restore.
///
/// Mints a token, stores it in a script-readable `XSRF-TOKEN` cookie and
/// returns it in the body.
pub async fn restore_csrf(csrf: CsrfToken) -> Response {
    let token = csrf.token();
    let cookie = csrf.policy().cookie(XSRF_COOKIE, token.clone(), false);

    let mut response = Json(CsrfRestoreResponse { token }).into_response();
    append_cookie(&mut response, &cookie);
    response
}
