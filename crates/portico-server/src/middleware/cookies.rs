//! Cookie parsing stage.
//!
//! Decodes every `Cookie` header into a [`CookieMap`] request extension.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use portico_core::{CookieMap, CoreError};

use crate::error::AppError;

/// Parses the request cookies or fails the request with a 400.
pub async fn parse_cookies(mut request: Request, next: Next) -> Response {
    match cookies_from_headers(request.headers()) {
        Ok(cookies) => {
            request.extensions_mut().insert(cookies);
            next.run(request).await
        },
        Err(err) => {
            tracing::debug!(error = %err, "Rejecting malformed cookie header");
            AppError::from(err).into_response()
        },
    }
}

/// Merges all `Cookie` headers into one map.
pub fn cookies_from_headers(headers: &HeaderMap) -> Result<CookieMap, CoreError> {
    let mut cookies = CookieMap::new();

    for value in headers.get_all(header::COOKIE) {
        let text = std::str::from_utf8(value.as_bytes())
            .map_err(|_| CoreError::malformed_cookie("header is not valid UTF-8"))?;
        cookies.extend_from_header(text)?;
    }

    Ok(cookies)
}

/// Extractor for the cookies parsed by the cookie stage.
#[derive(Debug, Clone)]
pub struct Cookies(pub CookieMap);

impl<S> FromRequestParts<S> for Cookies
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CookieMap>()
            .cloned()
            .map(Cookies)
            .ok_or_else(|| AppError::unhandled("cookie parsing stage is not installed"))
    }
}
