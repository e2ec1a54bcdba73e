//! Server configuration.
//!
//! Loaded once at startup from an optional `portico.{toml,yaml,json}` file in
//! the working directory, then overridden by `PORTICO_*` environment
//! variables. Nested keys use `__`, e.g. `PORTICO_CSRF__SECRET`.

use std::net::SocketAddr;

use portico_core::Environment;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Deployment environment; drives CORS, cookie flags and stack exposure.
    #[serde(default)]
    pub environment: Environment,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub body: BodySettings,

    #[serde(default)]
    pub csrf: CsrfSettings,

    #[serde(default)]
    pub metrics: MetricsSettings,
}

/// JSON body parsing limits.
#[derive(Debug, Clone, Deserialize)]
pub struct BodySettings {
    /// Largest accepted JSON body, in bytes.
    #[serde(default = "default_body_limit")]
    pub limit_bytes: usize,
}

/// CSRF protection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CsrfSettings {
    /// Key used to sign the secret cookie. Random per process when unset.
    #[serde(default)]
    pub secret: Option<String>,

    /// Name of the secret cookie.
    #[serde(default = "default_csrf_cookie")]
    pub cookie_name: String,
}

/// Prometheus metrics settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// Whether `/metrics` is served.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_body_limit() -> usize {
    100 * 1024
}

fn default_csrf_cookie() -> String {
    "_csrf".to_string()
}

fn default_true() -> bool {
    true
}

/// `PORTICO_*` variables, `__` between nested keys.
fn env_source() -> config::Environment {
    config::Environment::with_prefix("PORTICO")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl Default for BodySettings {
    fn default() -> Self {
        Self {
            limit_bytes: default_body_limit(),
        }
    }
}

impl Default for CsrfSettings {
    fn default() -> Self {
        Self {
            secret: None,
            cookie_name: default_csrf_cookie(),
        }
    }
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl ServerConfig {
    /// Loads configuration from `portico.*` and `PORTICO_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("portico")
    }

    /// Loads configuration from the named file (without extension) and the environment.
    pub fn load_from(file_stem: &str) -> Result<Self, ConfigError> {
        Self::load_with(file_stem, env_source())
    }

    fn load_with(file_stem: &str, env: config::Environment) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(file_stem).required(false))
            .add_source(env)
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Default configuration for the given environment.
    pub fn for_environment(environment: impl Into<Environment>) -> Self {
        Self {
            environment: environment.into(),
            host: default_host(),
            port: default_port(),
            body: BodySettings::default(),
            csrf: CsrfSettings::default(),
            metrics: MetricsSettings::default(),
        }
    }

    /// Returns true when running in production.
    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    /// Address the server binds to.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}
