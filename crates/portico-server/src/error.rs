//! Errors raised while serving a request.
//!
//! Any stage or route handler fails by returning an [`AppError`]. Turning it
//! into a response does not render anything yet: the error is converted into
//! an [`HttpError`] and attached to the response, where the error chain picks
//! it up, enriches it and writes the JSON envelope.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::sync::Arc;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use portico_core::{CoreError, DEFAULT_ERROR_MESSAGE, NOT_FOUND_MESSAGE, ValidationError};
use thiserror::Error;

/// What kind of input could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The `Cookie` header was not decodable.
    MalformedCookie,
    /// The JSON body did not parse.
    MalformedJson,
    /// The body exceeded the configured limit.
    BodyTooLarge,
    /// The body declared a charset other than UTF-8.
    UnsupportedCharset,
    /// The body stream failed while being read.
    BodyRead,
}

impl ParseErrorKind {
    /// Status the client receives for this kind.
    pub fn status(self) -> StatusCode {
        match self {
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedCharset => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::MalformedCookie | Self::MalformedJson | Self::BodyRead => {
                StatusCode::BAD_REQUEST
            },
        }
    }
}

/// An error with a status chosen by the route handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    status: StatusCode,
    message: String,
    title: Option<String>,
    errors: Vec<String>,
}

impl StatusError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            title: None,
            errors: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_errors<I, S>(mut self, errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.errors = errors.into_iter().map(Into::into).collect();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl std::fmt::Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for StatusError {}

/// Every way a request can fail.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed cookie header or request body.
    #[error("{message}")]
    Parse {
        kind: ParseErrorKind,
        message: String,
    },

    /// Missing or invalid CSRF token.
    #[error("invalid csrf token")]
    Csrf { reason: String },

    /// The data layer rejected a model.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No route handled the request.
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    /// A route handler failed with its own status.
    #[error("{0}")]
    Http(StatusError),

    /// Anything else.
    #[error("{message}")]
    Unhandled {
        message: String,
        #[source]
        cause: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl AppError {
    // ============================================
    // Convenience constructors
    // ============================================

    /// Creates a Parse error.
    pub fn parse(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self::Parse {
            kind,
            message: message.into(),
        }
    }

    /// Creates a Csrf error.
    pub fn csrf(reason: impl Into<String>) -> Self {
        Self::Csrf {
            reason: reason.into(),
        }
    }

    /// Creates an Unhandled error without a cause.
    pub fn unhandled(message: impl Into<String>) -> Self {
        Self::Unhandled {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates an Unhandled error wrapping a cause.
    pub fn unhandled_with_cause<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Unhandled {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates an error with an explicit status.
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http(StatusError::new(status, message))
    }

    // ============================================
    // Query methods
    // ============================================

    /// Name used as the first line of the rendered stack.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "ParseError",
            Self::Csrf { .. } => "CsrfError",
            Self::Validation(_) => "ValidationError",
            Self::NotFound => "NotFoundError",
            Self::Http(_) => "HttpError",
            Self::Unhandled { .. } => "UnhandledError",
        }
    }

    /// Returns the data-layer failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if no route handled the request.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedCookie { .. } => {
                Self::parse(ParseErrorKind::MalformedCookie, err.to_string())
            },
            CoreError::BadSignature | CoreError::InvalidToken { .. } => Self::csrf(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    /// Data-layer and handler status errors keep their meaning through `anyhow`.
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<ValidationError>() {
            Ok(validation) => return Self::Validation(validation),
            Err(err) => err,
        };
        let err = match err.downcast::<StatusError>() {
            Ok(status) => return Self::Http(status),
            Err(err) => err,
        };

        Self::Unhandled {
            message: err.to_string(),
            cause: Some(err.into()),
        }
    }
}

/// Extractor rejection as a handler status error.
fn rejected(status: StatusCode, detail: String) -> AppError {
    let title = status.canonical_reason().unwrap_or("Bad Request");
    AppError::Http(
        StatusError::new(status, detail.clone())
            .with_title(title)
            .with_errors([detail]),
    )
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<StatusError> for AppError {
    fn from(err: StatusError) -> Self {
        Self::Http(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        HttpError::from(self).into_response()
    }
}

/// The error object travelling through the error chain.
///
/// Exactly one exists per failed request. Error stages may change `title`,
/// `status` and `errors`; message, stack and origin are fixed at creation.
///
/// The backtrace is captured unresolved; the stack text is only built when
/// [`HttpError::stack`] is called.
#[derive(Debug, Clone)]
pub struct HttpError {
    message: String,
    status: Option<u16>,
    title: Option<String>,
    errors: Option<Vec<String>>,
    backtrace: Arc<Backtrace>,
    origin: Arc<AppError>,
}

impl HttpError {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn errors(&self) -> Option<&[String]> {
        self.errors.as_deref()
    }

    /// Renders the stack: kind and message, the cause chain, then the backtrace.
    pub fn stack(&self) -> String {
        render_stack(&self.origin, &self.backtrace)
    }

    /// The error this object was created from.
    pub fn origin(&self) -> &AppError {
        &self.origin
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    pub fn set_errors(&mut self, errors: Vec<String>) {
        self.errors = Some(errors);
    }

    /// Status to respond with; 500 when unset or out of range.
    pub fn status_code(&self) -> StatusCode {
        self.status
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Message to respond with; a generic one when empty.
    pub fn display_message(&self) -> &str {
        if self.message.is_empty() {
            DEFAULT_ERROR_MESSAGE
        } else {
            &self.message
        }
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        let backtrace = Arc::new(Backtrace::capture());
        let message = err.to_string();

        let (status, title, errors) = match &err {
            AppError::Parse { kind, .. } => (Some(kind.status().as_u16()), None, None),
            AppError::Csrf { .. } => (Some(StatusCode::FORBIDDEN.as_u16()), None, None),
            // Left for the validation normalizer.
            AppError::Validation(_) => (None, None, None),
            AppError::NotFound => (
                Some(StatusCode::NOT_FOUND.as_u16()),
                Some("Resource Not Found".to_string()),
                Some(vec![NOT_FOUND_MESSAGE.to_string()]),
            ),
            AppError::Http(e) => (
                Some(e.status.as_u16()),
                e.title.clone(),
                Some(e.errors.clone()),
            ),
            AppError::Unhandled { .. } => (None, None, None),
        };

        Self {
            message,
            status,
            title,
            errors,
            backtrace,
            origin: Arc::new(err),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = self.status_code().into_response();
        response.extensions_mut().insert(self);
        response
    }
}

fn render_stack(err: &AppError, backtrace: &Backtrace) -> String {
    let mut stack = format!("{}: {}", err.kind_name(), err);
    let mut last = err.to_string();

    let mut source = err.source();
    while let Some(cause) = source {
        let line = cause.to_string();
        if line != last {
            stack.push_str("\nCaused by: ");
            stack.push_str(&line);
        }
        last = line;
        source = cause.source();
    }

    if backtrace.status() == BacktraceStatus::Captured {
        stack.push('\n');
        stack.push_str(&backtrace.to_string());
    }

    stack
}
