//! Access token type.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::error::{AuthError, Error};

/// How long the device honours an access token after issuing it.
pub const TOKEN_LIFETIME: Duration = Duration::minutes(10);

/// A bearer token for authenticated requests.
///
/// Tokens are never refreshed by this library. [`AccessToken::is_expired`]
/// is a hint for callers deciding when to authenticate again.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    issued_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token issued now.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or cannot be carried in a header.
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        Self::issued_at(value, Utc::now())
    }

    /// Create a token with an explicit issue time.
    pub fn issued_at(value: impl Into<String>, issued_at: DateTime<Utc>) -> Result<Self, Error> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AuthError::InvalidToken {
                reason: "token is empty".to_string(),
            }
            .into());
        }
        if value.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return Err(AuthError::InvalidToken {
                reason: "token contains whitespace or control characters".to_string(),
            }
            .into());
        }
        Ok(Self { value, issued_at })
    }

    /// Returns the token value.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP authorization headers.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the `Authorization` header value.
    pub fn bearer_authorization(&self) -> String {
        format!("Bearer {}", self.value)
    }

    /// When the device issued this token.
    pub fn issued(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// When the device stops accepting this token.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + TOKEN_LIFETIME
    }

    /// Whether the token lifetime has elapsed.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at()
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_hides_value_in_debug() {
        let token = AccessToken::new("c2VjcmV0LXRva2Vu").unwrap();
        let debug = format!("{:?}", token);
        assert!(!debug.contains("c2VjcmV0"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn bearer_header_carries_exact_token() {
        let token = AccessToken::new("abc.def-123").unwrap();
        assert_eq!(token.bearer_authorization(), "Bearer abc.def-123");
    }

    #[test]
    fn expiry_is_ten_minutes_after_issue() {
        let issued = Utc::now() - Duration::minutes(11);
        let token = AccessToken::issued_at("old", issued).unwrap();
        assert_eq!(token.expires_at(), issued + Duration::minutes(10));
        assert!(token.is_expired());

        let fresh = AccessToken::new("fresh").unwrap();
        assert!(!fresh.is_expired());
    }

    #[test]
    fn rejects_unusable_tokens() {
        assert!(AccessToken::new("").is_err());
        assert!(AccessToken::new("   ").is_err());
        assert!(AccessToken::new("two words").is_err());
        assert!(AccessToken::new("line\nbreak").is_err());
    }
}
