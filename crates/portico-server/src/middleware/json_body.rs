//! JSON body parsing stage.
//!
//! Requests declaring `Content-Type: application/json` are buffered and
//! parsed. The parsed value is attached as a [`ParsedBody`] extension and the
//! raw bytes are put back so handlers can still use `axum::Json`.
//!
//! Rules:
//! - only objects and arrays are accepted at the top level;
//! - an empty body parses as `{}`;
//! - bodies over the configured limit are rejected with 413;
//! - a charset other than UTF-8 is rejected with 415.

use std::error::Error as StdError;

use axum::{
    body::{Body, Bytes},
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use serde_json::Value;

use crate::config::BodySettings;
use crate::error::{AppError, ParseErrorKind};

/// The parsed JSON body of the request.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody(pub Value);

impl ParsedBody {
    /// Looks up a top-level string field.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

/// Parses JSON request bodies.
pub async fn parse_json_body(
    State(settings): State<BodySettings>,
    request: Request,
    next: Next,
) -> Response {
    if !is_json(request.headers()) {
        return next.run(request).await;
    }

    match buffer_and_parse(request, settings.limit_bytes).await {
        Ok(request) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

async fn buffer_and_parse(request: Request, limit: usize) -> Result<Request, AppError> {
    check_charset(request.headers())?;

    if let Some(length) = declared_length(request.headers()) {
        if length > limit {
            return Err(too_large());
        }
    }

    let (mut parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|err| {
            if exceeded_limit(&err) {
                too_large()
            } else {
                AppError::parse(ParseErrorKind::BodyRead, format!("request aborted: {}", err))
            }
        })?;

    let value = parse_strict(&bytes)?;
    parts.extensions.insert(ParsedBody(value));

    Ok(Request::from_parts(parts, Body::from(bytes)))
}

/// Parses a body in strict mode.
pub fn parse_strict(bytes: &Bytes) -> Result<Value, AppError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| AppError::parse(ParseErrorKind::MalformedJson, "body is not valid UTF-8"))?;
    let trimmed = text.trim_start();

    match trimmed.chars().next() {
        None => return Ok(Value::Object(serde_json::Map::new())),
        Some('{') | Some('[') => {},
        Some(other) => {
            return Err(AppError::parse(
                ParseErrorKind::MalformedJson,
                format!("Unexpected token {} in JSON at position 0", other),
            ));
        },
    }

    serde_json::from_str(trimmed)
        .map_err(|err| AppError::parse(ParseErrorKind::MalformedJson, err.to_string()))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

fn check_charset(headers: &HeaderMap) -> Result<(), AppError> {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return Ok(());
    };

    let charset = content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"').to_ascii_lowercase());

    match charset.as_deref() {
        None | Some("utf-8") | Some("utf8") => Ok(()),
        Some(other) => Err(AppError::parse(
            ParseErrorKind::UnsupportedCharset,
            format!("unsupported charset \"{}\"", other.to_ascii_uppercase()),
        )),
    }
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn exceeded_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }
    false
}

fn too_large() -> AppError {
    AppError::parse(ParseErrorKind::BodyTooLarge, "request entity too large")
}

impl<S> FromRequestParts<S> for ParsedBody
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    /// Yields `{}` when the request had no JSON body.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<ParsedBody>()
            .cloned()
            .unwrap_or_else(|| ParsedBody(Value::Object(serde_json::Map::new()))))
    }
}
