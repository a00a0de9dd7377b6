//! Authentication error types.
//!
//! - [`AuthError`]: OAuth exchanges and token metadata checks
//! - [`CsrfError`]: redirect `state` validation
//! - [`SignatureError`]: signed-request verification
//!
//! # Example
//!
//! ```rust
//! use autoznetwork::auth::{AuthError, CsrfError};
//!
//! assert_eq!(AuthError::MissingAccessToken.code(), Some(401));
//! assert!(CsrfError::Mismatch.to_string().contains("do not match"));
//! ```

use thiserror::Error;

/// Errors raised by OAuth exchanges and token checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The token endpoint responded without an `access_token`.
    #[error("Access token was not returned from the API.")]
    MissingAccessToken,

    /// The client-code endpoint responded without a `code`.
    #[error("Code was not returned from the API.")]
    MissingCode,

    /// Logout URLs cannot be built for app access tokens.
    #[error("Cannot generate a logout URL with an app access token.")]
    LogoutWithAppToken,

    /// Token metadata lacked the `data` object.
    #[error("Unexpected access token metadata: a \"data\" object is required.")]
    InvalidMetadata,

    /// The inspected token belongs to a different app.
    #[error("Access token metadata contains unexpected app ID.")]
    UnexpectedAppId,

    /// The inspected token belongs to a different user.
    #[error("Access token metadata contains unexpected user ID.")]
    UnexpectedUserId,

    /// The inspected token has expired.
    #[error("Inspected access token has expired.")]
    ExpiredToken,
}

impl AuthError {
    /// Returns the numeric code associated with this error, if any.
    #[must_use]
    pub const fn code(&self) -> Option<i64> {
        match self {
            Self::MissingAccessToken | Self::MissingCode => Some(401),
            Self::LogoutWithAppToken => Some(722),
            _ => None,
        }
    }
}

/// Cross-site request forgery validation failures.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CsrfError {
    /// The inbound request carried no `state` query parameter.
    #[error("Cross-site request forgery validation failed. Required GET param \"state\" missing.")]
    MissingQueryState,

    /// No `state` was found in persistent data.
    #[error("Cross-site request forgery validation failed. Required param \"state\" missing from persistent data.")]
    MissingPersistedState,

    /// The inbound and persisted `state` values differ.
    #[error("Cross-site request forgery validation failed. The \"state\" param from the URL and session do not match.")]
    Mismatch,
}

/// Signed-request verification failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The input is not two non-empty dot-separated segments.
    #[error("Malformed signed request.")]
    Malformed,

    /// A segment is not valid base64url.
    #[error("Signed request has malformed encoded {segment} data.")]
    InvalidEncoding {
        /// Which segment failed to decode (`signature` or `payload`).
        segment: &'static str,
    },

    /// The payload is not a JSON object.
    #[error("Signed request has malformed payload: {reason}")]
    InvalidPayload {
        /// What was wrong with the payload.
        reason: String,
    },

    /// The declared algorithm is not `HMAC-SHA256`.
    #[error("Signed request is using the wrong algorithm '{algorithm}'.")]
    UnsupportedAlgorithm {
        /// The declared algorithm, or an empty string when absent.
        algorithm: String,
    },

    /// The signature does not match the payload.
    #[error("Signed request has an invalid signature.")]
    SignatureMismatch,
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthError>();
    assert_send_sync::<CsrfError>();
    assert_send_sync::<SignatureError>();
};
