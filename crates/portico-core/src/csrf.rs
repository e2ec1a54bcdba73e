//! CSRF secrets and tokens.
//!
//! A per-client secret lives in a cookie, signed with the server key so the
//! client cannot pick its own. Tokens are derived from the secret with a
//! random salt: `salt-base64url(HMAC-SHA256(secret, salt))`. Any number of
//! tokens can be minted for one secret and all of them verify.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::{Rng, RngCore, distributions::Alphanumeric};
use sha2::Sha256;

use crate::error::{CoreError, Result};

type HmacSha256 = Hmac<Sha256>;

const SECRET_BYTES: usize = 18;
const SALT_LEN: usize = 8;
const KEY_BYTES: usize = 32;

/// Signs secrets and mints/verifies tokens.
#[derive(Clone)]
pub struct CsrfTokens {
    key: Vec<u8>,
}

impl std::fmt::Debug for CsrfTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfTokens").finish_non_exhaustive()
    }
}

impl CsrfTokens {
    /// Creates a token service with the given signing key.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    /// Creates a token service with a random signing key.
    ///
    /// Cookies signed with it stop verifying once the process restarts.
    pub fn with_random_key() -> Self {
        let mut key = vec![0u8; KEY_BYTES];
        rand::thread_rng().fill_bytes(&mut key);
        Self { key }
    }

    /// Generates a fresh client secret.
    pub fn create_secret(&self) -> String {
        let mut bytes = [0u8; SECRET_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Returns `secret.signature`, the value stored in the cookie.
    pub fn sign_secret(&self, secret: &str) -> String {
        let mut mac = keyed(&self.key);
        mac.update(secret.as_bytes());
        format!(
            "{}.{}",
            secret,
            URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
        )
    }

    /// Extracts the secret from a signed cookie value.
    pub fn unsign_secret(&self, value: &str) -> Result<String> {
        let (secret, signature) = value.rsplit_once('.').ok_or(CoreError::BadSignature)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| CoreError::BadSignature)?;

        let mut mac = keyed(&self.key);
        mac.update(secret.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| CoreError::BadSignature)?;

        Ok(secret.to_string())
    }

    /// Mints a token for the secret.
    ///
    /// # Example
    ///
    /// ```
    /// use portico_core::CsrfTokens;
    ///
    /// let tokens = CsrfTokens::new(b"server-key".to_vec());
    /// let secret = tokens.create_secret();
    /// let token = tokens.create_token(&secret);
    ///
    /// assert!(tokens.verify_token(&secret, &token).is_ok());
    /// assert!(tokens.verify_token(&tokens.create_secret(), &token).is_err());
    /// ```
    pub fn create_token(&self, secret: &str) -> String {
        let salt: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SALT_LEN)
            .map(char::from)
            .collect();

        format!("{}-{}", salt, URL_SAFE_NO_PAD.encode(salted_tag(secret, &salt)))
    }

    /// Checks a token against the secret.
    pub fn verify_token(&self, secret: &str, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(CoreError::invalid_token("missing"));
        }

        let (salt, tag) = token
            .split_once('-')
            .ok_or_else(|| CoreError::invalid_token("no salt separator"))?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|_| CoreError::invalid_token("tag is not base64url"))?;

        let mut mac = keyed(secret.as_bytes());
        mac.update(salt.as_bytes());
        mac.verify_slice(&tag)
            .map_err(|_| CoreError::invalid_token("tag mismatch"))
    }
}

fn salted_tag(secret: &str, salt: &str) -> Vec<u8> {
    let mut mac = keyed(secret.as_bytes());
    mac.update(salt.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

fn keyed(key: &[u8]) -> HmacSha256 {
    // HMAC takes keys of any length.
    HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length")
}
