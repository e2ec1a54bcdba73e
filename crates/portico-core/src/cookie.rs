//! Cookie header decoding.

use std::collections::HashMap;

use crate::error::{CoreError, Result};

/// Cookies sent by the client, keyed by name.
///
/// Built from the `Cookie` request header(s). When a name appears more than
/// once the first value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieMap {
    cookies: HashMap<String, String>,
}

impl CookieMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a single `Cookie` header value.
    ///
    /// Pairs without `=` are ignored. Values are trimmed, unquoted and
    /// percent-decoded; a value that does not decode is kept as sent.
    /// Control characters make the whole header malformed.
    ///
    /// # Example
    ///
    /// ```
    /// use portico_core::CookieMap;
    ///
    /// let cookies = CookieMap::parse("theme=dark; name=%22Ada%20L%22").unwrap();
    /// assert_eq!(cookies.get("theme"), Some("dark"));
    /// assert_eq!(cookies.get("name"), Some("\"Ada L\""));
    /// ```
    pub fn parse(header: &str) -> Result<Self> {
        let mut map = Self::new();
        map.extend_from_header(header)?;
        Ok(map)
    }

    /// Adds the pairs of another `Cookie` header value.
    pub fn extend_from_header(&mut self, header: &str) -> Result<()> {
        if let Some(c) = header.chars().find(|c| c.is_control() && *c != '\t') {
            return Err(CoreError::malformed_cookie(format!(
                "control character U+{:04X} in header",
                c as u32
            )));
        }

        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };

            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            self.cookies
                .entry(name.to_string())
                .or_insert_with(|| decode_value(value.trim()));
        }

        Ok(())
    }

    /// Returns the value of a cookie.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Returns true if the cookie was sent.
    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Number of cookies.
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Returns true if no cookies were sent.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Iterates over `(name, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn decode_value(raw: &str) -> String {
    let unquoted = raw
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(raw);

    if !unquoted.contains('%') {
        return unquoted.to_string();
    }

    urlencoding::decode(unquoted)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| unquoted.to_string())
}
