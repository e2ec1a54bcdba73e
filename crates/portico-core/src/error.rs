//! Error types for Portico core.
//!
//! Everything in this crate that can fail returns `Result<T, CoreError>`.
//! The HTTP layer maps each variant onto the status the client sees.
//!
//! # Example
//!
//! ```
//! use portico_core::CookieMap;
//!
//! let err = CookieMap::parse("session=abc\u{7}").unwrap_err();
//! assert!(err.is_malformed_cookie());
//! ```

use thiserror::Error;

/// Main error type for Portico core operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The `Cookie` header could not be decoded.
    #[error("Malformed cookie header: {reason}")]
    MalformedCookie {
        /// Why the header was rejected
        reason: String,
    },

    /// A signed value did not carry a valid signature.
    #[error("Signature mismatch for signed value")]
    BadSignature,

    /// A CSRF token was missing or did not match the secret.
    #[error("Invalid CSRF token: {reason}")]
    InvalidToken {
        /// What was wrong with the token
        reason: String,
    },
}

impl CoreError {
    /// Creates a MalformedCookie error.
    pub fn malformed_cookie(reason: impl Into<String>) -> Self {
        Self::MalformedCookie {
            reason: reason.into(),
        }
    }

    /// Creates an InvalidToken error.
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    /// Returns true if the cookie header was rejected.
    pub fn is_malformed_cookie(&self) -> bool {
        matches!(self, Self::MalformedCookie { .. })
    }

    /// Returns true if this error comes from CSRF verification.
    pub fn is_csrf_failure(&self) -> bool {
        matches!(self, Self::BadSignature | Self::InvalidToken { .. })
    }
}

/// Type alias for Results with CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_cookie_display() {
        let error = CoreError::malformed_cookie("control character");
        let msg = format!("{}", error);

        assert!(msg.contains("control character"));
        assert!(error.is_malformed_cookie());
        assert!(!error.is_csrf_failure());
    }

    #[test]
    fn test_csrf_failures() {
        assert!(CoreError::BadSignature.is_csrf_failure());
        assert!(CoreError::invalid_token("missing").is_csrf_failure());
    }

    #[test]
    fn test_result_with_question_mark() {
        fn inner() -> Result<()> {
            Err(CoreError::BadSignature)
        }

        fn outer() -> Result<String> {
            inner()?;
            Ok("success".into())
        }

        assert_eq!(outer(), Err(CoreError::BadSignature));
    }
}
