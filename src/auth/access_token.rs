//! Access token entity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::oauth::hmac::compute_signature;

/// Number of seconds beyond which a token counts as long-lived.
const LONG_LIVED_THRESHOLD_SECS: i64 = 60 * 60 * 2;

/// A credential string authorizing API calls.
///
/// A token whose value contains `|` (the `app_id|app_secret` form) is an
/// *app access token*: it represents the application itself and never
/// expires, whatever expiry it carries.
///
/// Tokens are immutable once constructed. They serialize to
/// `{"value": "...", "expires_at": <unix seconds or null>}`.
///
/// # Example
///
/// ```rust
/// use autoznetwork::AccessToken;
///
/// let token = AccessToken::from("foo_token");
/// assert_eq!(token.to_string(), "foo_token");
/// assert!(!token.is_app_access_token());
///
/// let proof = token.app_secret_proof("shhhhh!is.my.secret");
/// assert_eq!(proof, "796ba0d8a6b339e476a7b166a9e8ac0a395f7de736dc37de5f2f4397f5854eb8");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    value: String,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Creates a token with an optional expiry.
    #[must_use]
    pub fn new(value: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Creates a token from a Unix timestamp expiry, where `0` means the
    /// token does not expire.
    #[must_use]
    pub fn from_timestamp(value: impl Into<String>, expires_at: i64) -> Self {
        let expires_at = if expires_at == 0 {
            None
        } else {
            DateTime::from_timestamp(expires_at, 0)
        };
        Self::new(value, expires_at)
    }

    /// Returns the raw token string.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the expiry, if known.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns `true` for `app_id|app_secret` tokens.
    #[must_use]
    pub fn is_app_access_token(&self) -> bool {
        self.value.contains('|')
    }

    /// Returns `true` if the token has expired.
    ///
    /// App access tokens never expire. Tokens without a known expiry are
    /// treated as not expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        if self.is_app_access_token() {
            return false;
        }
        self.expires_at.is_some_and(|expires| expires < Utc::now())
    }

    /// Returns `true` if the token is valid for more than two hours from now.
    ///
    /// A token without an expiry is considered long-lived.
    #[must_use]
    pub fn is_long_lived(&self) -> bool {
        self.expires_at.map_or(true, |expires| {
            expires > Utc::now() + Duration::seconds(LONG_LIVED_THRESHOLD_SECS)
        })
    }

    /// Computes the app secret proof for this token.
    ///
    /// The proof is the lowercase-hex HMAC-SHA256 of the token value keyed
    /// by the app secret.
    #[must_use]
    pub fn app_secret_proof(&self, app_secret: impl AsRef<str>) -> String {
        compute_signature(self.value.as_bytes(), app_secret.as_ref())
    }
}

impl From<&str> for AccessToken {
    fn from(value: &str) -> Self {
        Self::new(value, None)
    }
}

impl From<String> for AccessToken {
    fn from(value: String) -> Self {
        Self::new(value, None)
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"*****")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_can_be_returned_as_string() {
        let token = AccessToken::from("foo_token");
        assert_eq!(token.value(), "foo_token");
        assert_eq!(token.to_string(), "foo_token");
    }

    #[test]
    fn test_app_secret_proof_is_lowercase_hex_hmac() {
        let token = AccessToken::from("foo_token");
        assert_eq!(
            token.app_secret_proof("shhhhh!is.my.secret"),
            "796ba0d8a6b339e476a7b166a9e8ac0a395f7de736dc37de5f2f4397f5854eb8"
        );
        assert_eq!(
            token.app_secret_proof("foo_secret"),
            "df4256903ba4e23636cc142117aa632133d75c642bd2a68955be1443bd14deb9"
        );
    }

    #[test]
    fn test_app_access_token_is_detected() {
        assert!(!AccessToken::from("foo_token").is_app_access_token());
        assert!(AccessToken::from("123|secret").is_app_access_token());
    }

    #[test]
    fn test_app_access_token_never_expires_even_with_past_expiry() {
        for id in ["1", "123", "18446744073709551615"] {
            let expired = Utc::now() - Duration::days(30);
            let token = AccessToken::new(format!("{id}|secret"), Some(expired));
            assert!(!token.is_expired());
        }
    }

    #[test]
    fn test_token_can_expire() {
        let token = AccessToken::new("foo_token", Some(Utc::now() - Duration::seconds(100)));
        assert!(token.is_expired());
    }

    #[test]
    fn test_token_without_expiry_is_not_expired() {
        assert!(!AccessToken::from("foo_token").is_expired());
    }

    #[test]
    fn test_short_lived_token_is_detected() {
        let token = AccessToken::new("foo_token", Some(Utc::now() + Duration::minutes(90)));
        assert!(!token.is_long_lived());
    }

    #[test]
    fn test_long_lived_token_is_detected() {
        let token = AccessToken::new("foo_token", Some(Utc::now() + Duration::weeks(1)));
        assert!(token.is_long_lived());
        assert!(AccessToken::from("foo_token").is_long_lived());
    }

    #[test]
    fn test_from_timestamp_zero_means_no_expiry() {
        assert!(AccessToken::from_timestamp("foo", 0).expires_at().is_none());

        let token = AccessToken::from_timestamp("foo", 1_422_115_200);
        assert_eq!(token.expires_at().unwrap().timestamp(), 1_422_115_200);
    }

    #[test]
    fn test_serde_round_trip_preserves_value_and_expiry() {
        let token = AccessToken::from_timestamp("foo", 1_700_000_000);
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, r#"{"value":"foo","expires_at":1700000000}"#);

        let back: AccessToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
        assert_eq!(back.value(), "foo");
        assert_eq!(back.expires_at(), token.expires_at());
    }

    #[test]
    fn test_serde_round_trip_without_expiry() {
        let token = AccessToken::from("bar");
        let json = serde_json::to_string(&token).unwrap();
        let back: AccessToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);

        let missing: AccessToken = serde_json::from_str(r#"{"value":"bar"}"#).unwrap();
        assert!(missing.expires_at().is_none());
    }

    #[test]
    fn test_debug_masks_value() {
        let debug = format!("{:?}", AccessToken::from("very-secret-token"));
        assert!(!debug.contains("very-secret-token"));
    }
}
