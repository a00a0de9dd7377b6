//! Request validation and transport error types.
//!
//! - [`ValidationError`]: a request failed checks before it was sent
//! - [`TransportError`]: the HTTP exchange itself failed
//!
//! API-level failures (an `error` object in a response body) are
//! [`ResponseError`](crate::clients::ResponseError)s, not transport errors.
//! An HTTP 4xx or 5xx status is never a transport error on its own.
//!
//! # Example
//!
//! ```rust
//! use autoznetwork::clients::{TransportError, ValidationError};
//!
//! assert_eq!(ValidationError::MissingMethod.to_string(), "HTTP method not specified.");
//! assert_eq!(TransportError::EmptyResponse.code(), Some(660));
//! ```

use thiserror::Error;

/// Error returned when a request fails validation before it is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No HTTP method was set on the request.
    #[error("HTTP method not specified.")]
    MissingMethod,

    /// The HTTP method is not GET, POST or DELETE.
    #[error("Invalid HTTP method specified: {method}.")]
    InvalidMethod {
        /// The rejected method.
        method: String,
    },

    /// The request has no access token.
    #[error("You must provide an access token.")]
    MissingAccessToken,

    /// The `access_token` parameter differs from the request's token.
    #[error("Access token mismatch. The access token provided in the request and the one provided in the URL or POST params do not match.")]
    AccessTokenMismatch,

    /// An upload path does not point to a readable file.
    #[error("Failed to create upload: unable to open \"{path}\".")]
    FileNotFound {
        /// The path that was given.
        path: String,
    },

    /// An upload could not be read while building the request body.
    #[error("Failed to read \"{path}\": {reason}")]
    FileRead {
        /// The file being read.
        path: String,
        /// The underlying I/O error.
        reason: String,
    },
}

/// Error returned when the HTTP exchange fails.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The pooled HTTP client failed to connect, send or receive.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A socket operation of the stream client failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request did not complete within its timeout.
    #[error("Request timed out after {seconds} seconds.")]
    Timeout {
        /// The timeout that elapsed.
        seconds: u64,
    },

    /// The server closed the connection without sending a response.
    #[error("Stream returned an empty response")]
    EmptyResponse,

    /// The URL cannot be handled by the selected client.
    #[error("Unsupported URL \"{url}\": {reason}")]
    UnsupportedUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The response could not be parsed as HTTP.
    #[error("Malformed HTTP response: {reason}")]
    MalformedResponse {
        /// What was wrong with the response.
        reason: String,
    },
}

impl TransportError {
    /// Returns the numeric code associated with this error, if any.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::EmptyResponse => Some(660),
            Self::Network(e) => e.status().map(|s| i64::from(s.as_u16())),
            _ => None,
        }
    }

    /// Returns `true` if the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Network(e) => e.is_timeout(),
            Self::Io(e) => e.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        }
    }
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ValidationError>();
    assert_send_sync::<TransportError>();
};
