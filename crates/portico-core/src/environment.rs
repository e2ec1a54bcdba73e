//! Deployment environment flag.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The environment the server runs in, read once at startup.
///
/// Only `production` (case-insensitive) is treated as production. Any other
/// value keeps its name for logging but behaves as a development build.
///
/// # Example
///
/// ```
/// use portico_core::Environment;
///
/// assert!(Environment::from("Production").is_production());
/// assert!(!Environment::from("staging").is_production());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Environment {
    Production,
    #[default]
    Development,
    Test,
    /// Any other name. Non-production.
    Other(String),
}

impl Environment {
    /// Returns true only for the production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Returns the environment name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
            Self::Test => "test",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for Environment {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "production" => Self::Production,
            "development" | "" => Self::Development,
            "test" => Self::Test,
            _ => Self::Other(trimmed.to_string()),
        }
    }
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Environment> for String {
    fn from(value: Environment) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
