//! Error types for the AutozNetwork SDK.
//!
//! Each concern owns a focused error enum:
//!
//! - [`ConfigError`]: invalid or missing credentials and settings
//! - [`ValidationError`](crate::clients::ValidationError): malformed requests
//! - [`TransportError`](crate::clients::TransportError): connection-level failures
//! - [`ResponseError`](crate::clients::ResponseError): errors reported by the API
//! - [`AuthError`](crate::auth::AuthError), [`CsrfError`](crate::auth::CsrfError),
//!   [`SignatureError`](crate::auth::SignatureError): authentication flows
//!
//! [`Error`] unifies all of them for the high-level operations.
//!
//! # Example
//!
//! ```rust
//! use autoznetwork::{AppId, ConfigError};
//!
//! let result = AppId::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyAppId)));
//! ```

use thiserror::Error;

use crate::auth::{AuthError, CsrfError, SignatureError};
use crate::clients::{ResponseError, TransportError, ValidationError};

/// Errors that can occur during SDK configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// App ID cannot be empty.
    #[error("App ID cannot be empty. Please provide a valid AutozNetwork app ID.")]
    EmptyAppId,

    /// App ID is not a numeric string within the unsigned 64-bit range.
    #[error("Invalid app ID '{app_id}'. The app ID must be a numeric string that fits in an unsigned 64-bit integer.")]
    InvalidAppId {
        /// The invalid app ID that was provided.
        app_id: String,
    },

    /// App secret cannot be empty.
    #[error("App secret cannot be empty. Please provide a valid AutozNetwork app secret.")]
    EmptyAppSecret,

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'v<major>[.<minor>]' (e.g., 'v1.0').")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// A required field is missing and no environment fallback was found.
    #[error("Required '{field}' not supplied in config and could not find fallback environment variable '{env_var}'.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
        /// The environment variable consulted as a fallback.
        env_var: &'static str,
    },

    /// Base URL is invalid.
    #[error("Invalid base URL '{url}'. Please provide an absolute URL with scheme (e.g., 'https://api.example.com').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// HTTP client handler name is not recognized.
    #[error("The http client handler must be set to \"reqwest\" or \"stream\", got '{name}'.")]
    InvalidHttpClientHandler {
        /// The name that was provided.
        name: String,
    },

    /// Persistent data handler name is not recognized.
    #[error("The persistent data handler must be set to \"session\" or \"memory\", got '{name}'.")]
    InvalidPersistentDataHandler {
        /// The name that was provided.
        name: String,
    },
}

/// Unified error type for every fallible SDK operation.
///
/// Local validation failures are raised synchronously and never retried.
/// Transport failures bubble up unchanged. API errors are classified into
/// [`ApiErrorKind`](crate::clients::ApiErrorKind) and left for the caller to act on.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A request could not be built.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The transport failed before an HTTP response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The API returned an error payload.
    #[error(transparent)]
    Api(Box<ResponseError>),

    /// An OAuth exchange or token check failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Cross-site request forgery validation failed.
    #[error(transparent)]
    Csrf(#[from] CsrfError),

    /// A signed request could not be verified.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl From<ResponseError> for Error {
    fn from(error: ResponseError) -> Self {
        Self::Api(Box::new(error))
    }
}

impl Error {
    /// Returns the numeric error code, when the failure carries one.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Api(e) => Some(e.code()),
            Self::Auth(e) => e.code(),
            Self::Transport(e) => e.code(),
            _ => None,
        }
    }

    /// Returns the classified API error, if this is one.
    #[must_use]
    pub fn as_api_error(&self) -> Option<&ResponseError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

// Verify Error is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_app_id_error_message() {
        let message = ConfigError::EmptyAppId.to_string();
        assert!(message.contains("App ID cannot be empty"));
    }

    #[test]
    fn test_invalid_app_id_error_message() {
        let error = ConfigError::InvalidAppId {
            app_id: "18446744073709551616".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("18446744073709551616"));
        assert!(message.contains("64-bit"));
    }

    #[test]
    fn test_missing_required_field_names_env_var() {
        let error = ConfigError::MissingRequiredField {
            field: "app_id",
            env_var: "AUTOZNETWORK_APP_ID",
        };
        let message = error.to_string();
        assert!(message.contains("'app_id'"));
        assert!(message.contains("AUTOZNETWORK_APP_ID"));
    }

    #[test]
    fn test_error_wraps_config_error_transparently() {
        let error: Error = ConfigError::EmptyAppSecret.into();
        assert_eq!(error.to_string(), ConfigError::EmptyAppSecret.to_string());
        assert!(error.code().is_none());
    }

    #[test]
    fn test_auth_error_code_is_exposed() {
        let error: Error = AuthError::LogoutWithAppToken.into();
        assert_eq!(error.code(), Some(722));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyAppId;
        let _: &dyn std::error::Error = &error;
    }
}
