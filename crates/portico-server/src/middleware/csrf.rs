//! CSRF protection stage.
//!
//! Each client gets a random secret stored in a signed, HTTP-only cookie.
//! State-changing requests must echo a token derived from that secret; safe
//! methods (GET, HEAD, OPTIONS) pass without one. Handlers mint tokens with
//! the [`CsrfToken`] extractor.
//!
//! The token is looked up, in order, in the `_csrf` body field, the `_csrf`
//! query parameter, and the `csrf-token`, `xsrf-token`, `x-csrf-token` and
//! `x-xsrf-token` headers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Query, Request, State},
    http::{HeaderValue, Method, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use portico_core::{CookieMap, CsrfTokens, Environment};
use tracing::{debug, warn};

use crate::config::CsrfSettings;
use crate::error::AppError;
use crate::middleware::json_body::ParsedBody;

const TOKEN_FIELD: &str = "_csrf";
const TOKEN_HEADERS: [&str; 4] = ["csrf-token", "xsrf-token", "x-csrf-token", "x-xsrf-token"];

/// Attributes of the cookies written by this stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfCookiePolicy {
    pub name: String,
    pub path: String,
    pub http_only: bool,
    /// Set only in production.
    pub secure: bool,
    /// `Lax` in production; unset elsewhere so the browser default applies.
    pub same_site: Option<SameSite>,
}

impl CsrfCookiePolicy {
    pub fn for_environment(name: impl Into<String>, environment: &Environment) -> Self {
        let production = environment.is_production();

        Self {
            name: name.into(),
            path: "/".to_string(),
            http_only: true,
            secure: production,
            same_site: production.then_some(SameSite::Lax),
        }
    }

    /// Builds a cookie with this policy's attributes.
    pub fn cookie(&self, name: &str, value: String, http_only: bool) -> Cookie<'static> {
        let mut builder = Cookie::build((name.to_string(), value))
            .path(self.path.clone())
            .http_only(http_only)
            .secure(self.secure);

        if let Some(same_site) = self.same_site {
            builder = builder.same_site(same_site);
        }

        builder.build()
    }
}

/// Shared state of the CSRF stage.
#[derive(Debug, Clone)]
pub struct CsrfProtection {
    tokens: Arc<CsrfTokens>,
    policy: Arc<CsrfCookiePolicy>,
}

impl CsrfProtection {
    pub fn new(settings: &CsrfSettings, environment: &Environment) -> Self {
        let tokens = match settings.secret.as_deref() {
            Some(key) if !key.is_empty() => CsrfTokens::new(key.as_bytes().to_vec()),
            _ => {
                if environment.is_production() {
                    warn!("csrf.secret is not set; CSRF cookies will not survive a restart");
                }
                CsrfTokens::with_random_key()
            },
        };

        Self {
            tokens: Arc::new(tokens),
            policy: Arc::new(CsrfCookiePolicy::for_environment(
                settings.cookie_name.clone(),
                environment,
            )),
        }
    }

    pub fn policy(&self) -> &CsrfCookiePolicy {
        &self.policy
    }

    fn secret_from(&self, cookies: &CookieMap) -> Option<String> {
        let value = cookies.get(&self.policy.name)?;
        match self.tokens.unsign_secret(value) {
            Ok(secret) => Some(secret),
            Err(err) => {
                debug!(error = %err, "Discarding CSRF secret cookie");
                None
            },
        }
    }

    fn secret_cookie(&self, secret: &str) -> Cookie<'static> {
        self.policy.cookie(
            &self.policy.name,
            self.tokens.sign_secret(secret),
            self.policy.http_only,
        )
    }
}

/// Validates CSRF tokens on state-changing requests.
pub async fn protect(
    State(csrf): State<CsrfProtection>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(cookies) = request.extensions().get::<CookieMap>() else {
        return AppError::unhandled("misconfigured csrf: cookies must be parsed first")
            .into_response();
    };

    let (secret, new_cookie) = match csrf.secret_from(cookies) {
        Some(secret) => (secret, None),
        None => {
            let secret = csrf.tokens.create_secret();
            let cookie = csrf.secret_cookie(&secret);
            (secret, Some(cookie))
        },
    };

    request.extensions_mut().insert(CsrfToken {
        secret: secret.clone(),
        csrf: csrf.clone(),
    });

    let mut response = if is_safe_method(request.method()) {
        next.run(request).await
    } else {
        let token = submitted_token(&request).unwrap_or_default();
        match csrf.tokens.verify_token(&secret, &token) {
            Ok(()) => next.run(request).await,
            Err(err) => AppError::from(err).into_response(),
        }
    };

    if let Some(cookie) = new_cookie {
        append_cookie(&mut response, &cookie);
    }

    response
}

fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn submitted_token(request: &Request) -> Option<String> {
    if let Some(token) = request
        .extensions()
        .get::<ParsedBody>()
        .and_then(|body| body.str_field(TOKEN_FIELD))
    {
        return Some(token.to_string());
    }

    if let Ok(Query(query)) = Query::<HashMap<String, String>>::try_from_uri(request.uri()) {
        if let Some(token) = query.get(TOKEN_FIELD) {
            return Some(token.clone());
        }
    }

    TOKEN_HEADERS.iter().find_map(|name| {
        request
            .headers()
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    })
}

/// Appends a `Set-Cookie` header to the response.
pub fn append_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        },
        Err(err) => warn!(cookie = cookie.name(), error = %err, "Cookie is not a valid header"),
    }
}

/// Mints CSRF tokens for the current client.
#[derive(Debug, Clone)]
pub struct CsrfToken {
    secret: String,
    csrf: CsrfProtection,
}

impl CsrfToken {
    /// Returns a new token bound to this client's secret.
    pub fn token(&self) -> String {
        self.csrf.tokens.create_token(&self.secret)
    }

    /// Cookie policy in effect, for handlers that set their own cookies.
    pub fn policy(&self) -> &CsrfCookiePolicy {
        self.csrf.policy()
    }
}

impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CsrfToken>()
            .cloned()
            .ok_or_else(|| AppError::unhandled("CSRF protection is not installed"))
    }
}
