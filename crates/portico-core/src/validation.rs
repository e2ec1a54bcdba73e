//! Validation failures raised by the data-access layer.
//!
//! This is the shape the error chain recognizes when it rewrites a failed
//! save into a `400 Validation Error` response: an overall message plus one
//! item per violated constraint, in the order the model reported them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A model failed one or more field validations.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
    errors: Vec<ValidationErrorItem>,
}

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorItem {
    /// Human readable message shown to the client.
    pub message: String,

    /// Attribute that failed, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Offending value as it was submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,

    /// Constraint name, e.g. `notNull` or `len`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ValidationErrorItem {
    /// Creates an item with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            value: None,
            kind: None,
        }
    }

    /// Sets the attribute path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the offending value.
    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the constraint name.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

impl ValidationError {
    /// Creates a validation error from its items.
    ///
    /// The message lists every item, one per line.
    ///
    /// # Example
    ///
    /// ```
    /// use portico_core::{ValidationError, ValidationErrorItem};
    ///
    /// let err = ValidationError::new(vec![
    ///     ValidationErrorItem::new("email required").with_path("email"),
    ///     ValidationErrorItem::new("password too short").with_path("password"),
    /// ]);
    ///
    /// assert_eq!(err.messages(), vec!["email required", "password too short"]);
    /// ```
    pub fn new(errors: Vec<ValidationErrorItem>) -> Self {
        let message = errors
            .iter()
            .map(|item| format!("Validation error: {}", item.message))
            .collect::<Vec<_>>()
            .join(",\n");

        Self { message, errors }
    }

    /// Creates a validation error with an explicit message.
    pub fn with_message(message: impl Into<String>, errors: Vec<ValidationErrorItem>) -> Self {
        Self {
            message: message.into(),
            errors,
        }
    }

    /// Shorthand for errors that only carry messages.
    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(messages.into_iter().map(ValidationErrorItem::new).collect())
    }

    /// Returns the overall message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the individual failures in reported order.
    pub fn errors(&self) -> &[ValidationErrorItem] {
        &self.errors
    }

    /// Returns the item messages in reported order.
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }
}
