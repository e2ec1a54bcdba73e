//! Middleware stack para el servidor HTTP.
//!
//! Una etapa por modulo, en el orden en que `Pipeline` las instala:
//! - `RequestIdLayer` / `LoggingLayer`: X-Request-Id y logging estructurado
//! - `parse_cookies`: decodifica el header `Cookie`
//! - `parse_json_body`: parsea bodies `application/json`
//! - `resource_policy_layer`: `Cross-Origin-Resource-Policy`
//! - `permissive_cors_layer`: CORS, solo fuera de produccion
//! - `protect`: validacion de tokens CSRF

pub mod cookies;
pub mod cors;
pub mod csrf;
pub mod json_body;
mod logging;
mod request_id;
pub mod security_headers;

pub use cookies::{Cookies, parse_cookies};
pub use cors::permissive_cors_layer;
pub use csrf::{CsrfCookiePolicy, CsrfProtection, CsrfToken, protect};
pub use json_body::{ParsedBody, parse_json_body};
pub use logging::{LoggingLayer, LoggingMiddleware};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer, RequestIdMiddleware};
pub use security_headers::{CROSS_ORIGIN_RESOURCE_POLICY, resource_policy_layer};
