//! Request pipeline assembly.
//!
//! The pipeline is an explicit, ordered list of [`Stage`]s decided once at
//! startup from the configuration. Whether CORS is part of it is settled
//! here, not per request.
//!
//! Request flow (outermost first):
//!
//! ```text
//! Logger -> ErrorChain -> CookieParser -> JsonBody -> SecurityHeaders
//!        -> Cors (non-production only) -> Csrf -> Routes
//! ```
//!
//! A stage fails by answering with an [`AppError`](crate::AppError) instead of
//! calling the next stage; the error chain then formats the response.

use std::fmt;
use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::info;

use crate::config::{BodySettings, ServerConfig};
use crate::error_chain::{ErrorChain, fall_through, handle_errors, panic_response};
use crate::metrics::http::http_metrics_middleware;
use crate::middleware::{
    CsrfProtection, LoggingLayer, RequestIdLayer, parse_cookies, parse_json_body,
    permissive_cors_layer, protect, resource_policy_layer,
};

/// One step of the request pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Logger,
    /// Catches failures and panics of every later stage.
    ErrorChain,
    CookieParser,
    JsonBody,
    SecurityHeaders,
    Cors,
    Csrf,
    Routes,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Logger => "logger",
            Self::ErrorChain => "error_chain",
            Self::CookieParser => "cookie_parser",
            Self::JsonBody => "json_body",
            Self::SecurityHeaders => "security_headers",
            Self::Cors => "cors",
            Self::Csrf => "csrf",
            Self::Routes => "routes",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The assembled pipeline.
#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<Stage>,
    body: BodySettings,
    csrf: CsrfProtection,
    errors: Arc<ErrorChain>,
}

impl Pipeline {
    /// Decides the stage list for the configured environment.
    pub fn assemble(config: &ServerConfig) -> Self {
        let mut stages = vec![
            Stage::Logger,
            Stage::ErrorChain,
            Stage::CookieParser,
            Stage::JsonBody,
            Stage::SecurityHeaders,
        ];
        if !config.is_production() {
            stages.push(Stage::Cors);
        }
        stages.extend([Stage::Csrf, Stage::Routes]);

        let errors = ErrorChain::standard(&config.environment);

        info!(
            environment = %config.environment,
            stages = ?stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            error_chain = ?errors.stage_names(),
            "Request pipeline assembled"
        );

        Self {
            stages,
            body: config.body.clone(),
            csrf: CsrfProtection::new(&config.csrf, &config.environment),
            errors: Arc::new(errors),
        }
    }

    /// Stages in request order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn error_chain(&self) -> &ErrorChain {
        &self.errors
    }

    /// Wraps the route table in every stage.
    ///
    /// Unmatched paths and methods fall through to the error chain.
    pub fn apply(&self, routes: Router) -> Router {
        let mut router = routes
            .fallback(fall_through)
            .method_not_allowed_fallback(fall_through);

        // Layers wrap what is already there, so install innermost first.
        for stage in self.stages.iter().rev() {
            router = match stage {
                Stage::Routes => router,
                Stage::Csrf => router.layer(from_fn_with_state(self.csrf.clone(), protect)),
                Stage::Cors => router.layer(permissive_cors_layer()),
                Stage::SecurityHeaders => router.layer(resource_policy_layer()),
                Stage::JsonBody => {
                    router.layer(from_fn_with_state(self.body.clone(), parse_json_body))
                },
                Stage::CookieParser => router.layer(from_fn(parse_cookies)),
                Stage::ErrorChain => router
                    .layer(CatchPanicLayer::custom(panic_response))
                    .layer(from_fn_with_state(self.errors.clone(), handle_errors)),
                Stage::Logger => router
                    .layer(from_fn(http_metrics_middleware))
                    .layer(LoggingLayer)
                    .layer(RequestIdLayer),
            };
        }

        router
    }
}
