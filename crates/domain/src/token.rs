//! Opaque bearer token issued by the vendor portal.

use serde::{Deserialize, Serialize};

/// Bearer token extracted from the portal's local storage after login.
///
/// The token carries no expiry; it is trusted until the portal rejects it
/// with an authentication failure. `Debug` redacts the value so tokens
/// never leak into logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw token value, for use in an `Authorization` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token is the empty string (never valid).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken(len={})", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_raw_value() {
        let token = AccessToken::new("abc123");
        assert_eq!(token.as_str(), "abc123");
        assert!(!token.is_empty());
    }

    #[test]
    fn should_redact_value_in_debug_output() {
        let token = AccessToken::new("super-secret");
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("len=12"));
    }

    #[test]
    fn should_serialize_as_plain_string() {
        let token = AccessToken::new("abc");
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"abc\"");
        let back: AccessToken = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, token);
    }
}
