//! Metadata returned by the `/debug_token` endpoint.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::auth::AuthError;

/// Metadata describing an access token, as returned by
/// [`OAuth2Client::debug_token`](crate::auth::oauth::OAuth2Client::debug_token).
///
/// # Example
///
/// ```rust
/// use autoznetwork::auth::AccessTokenMetadata;
/// use serde_json::json;
///
/// let metadata = AccessTokenMetadata::new(&json!({
///     "data": {"app_id": "123", "user_id": "1337", "is_valid": true}
/// }))
/// .unwrap();
///
/// assert_eq!(metadata.app_id().as_deref(), Some("123"));
/// assert!(metadata.validate_user_id("1337").is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AccessTokenMetadata {
    data: Map<String, Value>,
}

impl AccessTokenMetadata {
    /// Parses a decoded `/debug_token` response.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidMetadata`] unless `body` has a `data` object.
    pub fn new(body: &Value) -> Result<Self, AuthError> {
        match body.get("data") {
            Some(Value::Object(data)) => Ok(Self { data: data.clone() }),
            _ => Err(AuthError::InvalidMetadata),
        }
    }

    /// Returns a raw field from the `data` object.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    fn string_field(&self, key: &str) -> Option<String> {
        self.field(key).and_then(value_to_string)
    }

    fn error_field(&self, key: &str) -> Option<&Value> {
        self.field("error").and_then(|e| e.get(key))
    }

    fn metadata_field(&self, key: &str) -> Option<String> {
        self.field("metadata")
            .and_then(|m| m.get(key))
            .and_then(value_to_string)
    }

    fn timestamp_field(&self, key: &str) -> Option<DateTime<Utc>> {
        self.field(key)
            .and_then(value_to_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// The ID of the app the token was issued for.
    #[must_use]
    pub fn app_id(&self) -> Option<String> {
        self.string_field("app_id")
    }

    /// The name of the app the token was issued for.
    #[must_use]
    pub fn application(&self) -> Option<String> {
        self.string_field("application")
    }

    /// Returns `true` when the metadata describes an error with the token.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.field("error").is_some()
    }

    /// The error code, when the token has an error.
    #[must_use]
    pub fn error_code(&self) -> Option<i64> {
        self.error_field("code").and_then(value_to_i64)
    }

    /// The error message, when the token has an error.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error_field("message").and_then(value_to_string)
    }

    /// The error subcode, when the token has an error.
    #[must_use]
    pub fn error_subcode(&self) -> Option<i64> {
        self.error_field("subcode").and_then(value_to_i64)
    }

    /// When the token was issued.
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_field("issued_at")
    }

    /// When the token expires.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_field("expires_at")
    }

    /// Whether the token is currently valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.field("is_valid").and_then(Value::as_bool).unwrap_or(false)
    }

    /// The `metadata.sso` value.
    #[must_use]
    pub fn sso(&self) -> Option<String> {
        self.metadata_field("sso")
    }

    /// The `metadata.auth_type` value.
    #[must_use]
    pub fn auth_type(&self) -> Option<String> {
        self.metadata_field("auth_type")
    }

    /// The `metadata.auth_nonce` value.
    #[must_use]
    pub fn auth_nonce(&self) -> Option<String> {
        self.metadata_field("auth_nonce")
    }

    /// The profile ID the token was issued for.
    #[must_use]
    pub fn profile_id(&self) -> Option<String> {
        self.string_field("profile_id")
    }

    /// The permissions granted to the token.
    #[must_use]
    pub fn scopes(&self) -> Vec<String> {
        self.field("scopes")
            .and_then(Value::as_array)
            .map(|scopes| scopes.iter().filter_map(value_to_string).collect())
            .unwrap_or_default()
    }

    /// The user the token was issued for.
    #[must_use]
    pub fn user_id(&self) -> Option<String> {
        self.string_field("user_id")
    }

    /// Ensures the token was issued for `app_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnexpectedAppId`] on mismatch.
    pub fn validate_app_id(&self, app_id: &str) -> Result<(), AuthError> {
        if self.app_id().as_deref() == Some(app_id) {
            Ok(())
        } else {
            Err(AuthError::UnexpectedAppId)
        }
    }

    /// Ensures the token was issued for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnexpectedUserId`] on mismatch.
    pub fn validate_user_id(&self, user_id: &str) -> Result<(), AuthError> {
        if self.user_id().as_deref() == Some(user_id) {
            Ok(())
        } else {
            Err(AuthError::UnexpectedUserId)
        }
    }

    /// Ensures the token has not expired. Tokens without an expiry pass.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ExpiredToken`] if the expiry is in the past.
    pub fn validate_expiration(&self) -> Result<(), AuthError> {
        match self.expires_at() {
            Some(expires) if expires < Utc::now() => Err(AuthError::ExpiredToken),
            _ => Ok(()),
        }
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(expires_at: i64) -> Value {
        json!({
            "data": {
                "app_id": "123",
                "application": "Foo App",
                "error": {
                    "code": 190,
                    "message": "Foo error message.",
                    "subcode": 463
                },
                "issued_at": 1_422_110_200,
                "expires_at": expires_at,
                "is_valid": false,
                "metadata": {
                    "sso": "iphone-sso",
                    "auth_type": "rerequest",
                    "auth_nonce": "no-replicatey"
                },
                "scopes": ["public_profile", "basic_info", "user_friends"],
                "profile_id": "1000",
                "user_id": "1337"
            }
        })
    }

    #[test]
    fn test_dates_are_parsed() {
        let metadata = AccessTokenMetadata::new(&response(1_422_115_200)).unwrap();
        assert_eq!(metadata.issued_at().unwrap().timestamp(), 1_422_110_200);
        assert_eq!(metadata.expires_at().unwrap().timestamp(), 1_422_115_200);
    }

    #[test]
    fn test_all_getters_return_the_proper_value() {
        let metadata = AccessTokenMetadata::new(&response(1_422_115_200)).unwrap();

        assert_eq!(metadata.app_id().as_deref(), Some("123"));
        assert_eq!(metadata.application().as_deref(), Some("Foo App"));
        assert!(metadata.is_error());
        assert_eq!(metadata.error_code(), Some(190));
        assert_eq!(metadata.error_message().as_deref(), Some("Foo error message."));
        assert_eq!(metadata.error_subcode(), Some(463));
        assert!(!metadata.is_valid());
        assert_eq!(metadata.sso().as_deref(), Some("iphone-sso"));
        assert_eq!(metadata.auth_type().as_deref(), Some("rerequest"));
        assert_eq!(metadata.auth_nonce().as_deref(), Some("no-replicatey"));
        assert_eq!(metadata.profile_id().as_deref(), Some("1000"));
        assert_eq!(
            metadata.scopes(),
            vec!["public_profile", "basic_info", "user_friends"]
        );
        assert_eq!(metadata.user_id().as_deref(), Some("1337"));
    }

    #[test]
    fn test_numeric_ids_are_stringified() {
        let metadata = AccessTokenMetadata::new(&json!({"data": {"app_id": 123}})).unwrap();
        assert_eq!(metadata.app_id().as_deref(), Some("123"));
    }

    #[test]
    fn test_invalid_metadata_is_rejected() {
        assert_eq!(
            AccessTokenMetadata::new(&json!({"foo": "bar"})),
            Err(AuthError::InvalidMetadata)
        );
        assert_eq!(
            AccessTokenMetadata::new(&json!({"data": "nope"})),
            Err(AuthError::InvalidMetadata)
        );
    }

    #[test]
    fn test_app_id_validation() {
        let metadata = AccessTokenMetadata::new(&response(0)).unwrap();
        assert!(metadata.validate_app_id("123").is_ok());
        assert_eq!(metadata.validate_app_id("foo"), Err(AuthError::UnexpectedAppId));
    }

    #[test]
    fn test_user_id_validation() {
        let metadata = AccessTokenMetadata::new(&response(0)).unwrap();
        assert!(metadata.validate_user_id("1337").is_ok());
        assert_eq!(metadata.validate_user_id("foo"), Err(AuthError::UnexpectedUserId));
    }

    #[test]
    fn test_expiration_validation() {
        let now = Utc::now().timestamp();

        let active = AccessTokenMetadata::new(&response(now + 1000)).unwrap();
        assert!(active.validate_expiration().is_ok());

        let expired = AccessTokenMetadata::new(&response(now - 1000)).unwrap();
        assert_eq!(expired.validate_expiration(), Err(AuthError::ExpiredToken));
    }
}
