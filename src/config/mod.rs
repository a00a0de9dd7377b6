//! Configuration types for the AutozNetwork SDK.
//!
//! # Overview
//!
//! - [`SdkConfig`]: all settings needed to build an [`AutozNetwork`](crate::AutozNetwork)
//! - [`SdkConfigBuilder`]: a builder for [`SdkConfig`] with environment fallbacks
//! - [`AppId`] / [`AppSecret`]: validated credential newtypes
//! - [`App`]: the credentials pair
//! - [`ApiVersion`]: the REST API version to target
//!
//! # Environment fallback
//!
//! When the app ID or secret is not set on the builder, `build()` reads
//! `AUTOZNETWORK_APP_ID` and `AUTOZNETWORK_APP_SECRET`.
//!
//! # Example
//!
//! ```rust
//! use autoznetwork::{SdkConfig, AppId, AppSecret, ApiVersion};
//!
//! let config = SdkConfig::builder()
//!     .app_id(AppId::new("123").unwrap())
//!     .app_secret(AppSecret::new("my-secret").unwrap())
//!     .default_api_version(ApiVersion::new("v1.0").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.app().id().as_ref(), "123");
//! assert!(!config.beta_mode());
//! ```

mod app;
mod newtypes;
mod version;

pub use app::App;
pub use newtypes::{AppId, AppSecret};
pub use version::ApiVersion;

use std::sync::Arc;

use crate::auth::oauth::{PseudoRandomStringGenerator, RandomStringGenerator};
use crate::auth::AccessToken;
use crate::clients::HttpClientHandler;
use crate::error::ConfigError;
use crate::persistence::PersistentDataBackend;
use crate::url::RequestContext;

/// Environment variable consulted when no app ID is configured.
pub const APP_ID_ENV_NAME: &str = "AUTOZNETWORK_APP_ID";

/// Environment variable consulted when no app secret is configured.
pub const APP_SECRET_ENV_NAME: &str = "AUTOZNETWORK_APP_SECRET";

/// Configuration for the AutozNetwork SDK.
///
/// Handler choices (transport, persistence, random source) are explicit
/// values resolved once, when the [`AutozNetwork`](crate::AutozNetwork) facade is built.
#[derive(Clone, Debug)]
pub struct SdkConfig {
    app: App,
    default_api_version: ApiVersion,
    beta_mode: bool,
    api_base_url: Option<String>,
    http_client_handler: HttpClientHandler,
    persistent_data_backend: PersistentDataBackend,
    random_string_generator: Arc<dyn PseudoRandomStringGenerator>,
    request_context: RequestContext,
    default_access_token: Option<AccessToken>,
}

impl SdkConfig {
    /// Creates a new builder for constructing an `SdkConfig`.
    #[must_use]
    pub fn builder() -> SdkConfigBuilder {
        SdkConfigBuilder::new()
    }

    /// Returns the app credentials.
    #[must_use]
    pub const fn app(&self) -> &App {
        &self.app
    }

    /// Returns the API version used when a request does not name one.
    #[must_use]
    pub const fn default_api_version(&self) -> &ApiVersion {
        &self.default_api_version
    }

    /// Returns whether requests go to the beta API host.
    #[must_use]
    pub const fn beta_mode(&self) -> bool {
        self.beta_mode
    }

    /// Returns the base URL override, if any.
    #[must_use]
    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }

    /// Returns the selected HTTP transport.
    #[must_use]
    pub const fn http_client_handler(&self) -> &HttpClientHandler {
        &self.http_client_handler
    }

    /// Returns the selected persistent-data backend.
    #[must_use]
    pub const fn persistent_data_backend(&self) -> &PersistentDataBackend {
        &self.persistent_data_backend
    }

    /// Returns the generator used for CSRF state values.
    #[must_use]
    pub fn random_string_generator(&self) -> Arc<dyn PseudoRandomStringGenerator> {
        Arc::clone(&self.random_string_generator)
    }

    /// Returns the inbound request context.
    #[must_use]
    pub const fn request_context(&self) -> &RequestContext {
        &self.request_context
    }

    /// Returns the access token used when a call does not supply one.
    #[must_use]
    pub const fn default_access_token(&self) -> Option<&AccessToken> {
        self.default_access_token.as_ref()
    }
}

// Verify SdkConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SdkConfig>();
};

/// Builder for constructing [`SdkConfig`] instances.
///
/// The app ID and secret are required, either set here or through the
/// `AUTOZNETWORK_APP_ID` / `AUTOZNETWORK_APP_SECRET` environment variables.
/// Everything else has a default:
///
/// - API version `v1.0`
/// - beta mode off
/// - the pooled `reqwest` transport
/// - in-memory persistence
/// - the OS-backed random generator
/// - an empty request context
#[derive(Debug, Default)]
pub struct SdkConfigBuilder {
    app_id: Option<AppId>,
    app_secret: Option<AppSecret>,
    default_api_version: Option<ApiVersion>,
    beta_mode: Option<bool>,
    api_base_url: Option<String>,
    http_client_handler: Option<HttpClientHandler>,
    persistent_data_backend: Option<PersistentDataBackend>,
    random_string_generator: Option<Arc<dyn PseudoRandomStringGenerator>>,
    request_context: Option<RequestContext>,
    default_access_token: Option<AccessToken>,
}

impl SdkConfigBuilder {
    /// Creates a new builder with all fields unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the app ID.
    #[must_use]
    pub fn app_id(mut self, id: AppId) -> Self {
        self.app_id = Some(id);
        self
    }

    /// Sets the app secret.
    #[must_use]
    pub fn app_secret(mut self, secret: AppSecret) -> Self {
        self.app_secret = Some(secret);
        self
    }

    /// Sets the default API version.
    #[must_use]
    pub fn default_api_version(mut self, version: ApiVersion) -> Self {
        self.default_api_version = Some(version);
        self
    }

    /// Routes requests to the beta API host.
    #[must_use]
    pub const fn enable_beta_mode(mut self, enabled: bool) -> Self {
        self.beta_mode = Some(enabled);
        self
    }

    /// Overrides the API base URL (both production and beta).
    ///
    /// Useful behind a proxy or when pointing the SDK at a local mock server.
    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Selects the HTTP transport.
    #[must_use]
    pub fn http_client_handler(mut self, handler: HttpClientHandler) -> Self {
        self.http_client_handler = Some(handler);
        self
    }

    /// Selects the persistent-data backend.
    #[must_use]
    pub fn persistent_data_backend(mut self, backend: PersistentDataBackend) -> Self {
        self.persistent_data_backend = Some(backend);
        self
    }

    /// Replaces the random generator used for CSRF state values.
    #[must_use]
    pub fn random_string_generator(mut self, generator: Arc<dyn PseudoRandomStringGenerator>) -> Self {
        self.random_string_generator = Some(generator);
        self
    }

    /// Sets the inbound request context (current URL, query, POST data, cookies).
    #[must_use]
    pub fn request_context(mut self, context: RequestContext) -> Self {
        self.request_context = Some(context);
        self
    }

    /// Sets the access token used when a call does not supply one.
    #[must_use]
    pub fn default_access_token(mut self, token: impl Into<AccessToken>) -> Self {
        self.default_access_token = Some(token.into());
        self
    }

    /// Builds the [`SdkConfig`], validating required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if the app ID or secret
    /// is neither set nor available from the environment, an app ID or
    /// secret error if the environment value is invalid, or
    /// [`ConfigError::InvalidBaseUrl`] for a relative base URL.
    pub fn build(self) -> Result<SdkConfig, ConfigError> {
        let app_id = match self.app_id {
            Some(id) => id,
            None => AppId::new(Self::required_env("app_id", APP_ID_ENV_NAME)?)?,
        };
        let app_secret = match self.app_secret {
            Some(secret) => secret,
            None => AppSecret::new(Self::required_env("app_secret", APP_SECRET_ENV_NAME)?)?,
        };

        let api_base_url = self
            .api_base_url
            .map(|url| {
                let trimmed = url.trim_end_matches('/');
                if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
                    Ok(trimmed.to_string())
                } else {
                    Err(ConfigError::InvalidBaseUrl { url })
                }
            })
            .transpose()?;

        Ok(SdkConfig {
            app: App::new(app_id, app_secret),
            default_api_version: self.default_api_version.unwrap_or_default(),
            beta_mode: self.beta_mode.unwrap_or(false),
            api_base_url,
            http_client_handler: self.http_client_handler.unwrap_or_default(),
            persistent_data_backend: self.persistent_data_backend.unwrap_or_default(),
            random_string_generator: self
                .random_string_generator
                .unwrap_or_else(|| Arc::new(RandomStringGenerator::new())),
            request_context: self.request_context.unwrap_or_default(),
            default_access_token: self.default_access_token,
        })
    }

    fn required_env(field: &'static str, env_var: &'static str) -> Result<String, ConfigError> {
        std::env::var(env_var)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingRequiredField { field, env_var })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> SdkConfigBuilder {
        SdkConfig::builder()
            .app_id(AppId::new("123").unwrap())
            .app_secret(AppSecret::new("foo_secret").unwrap())
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = builder().build().unwrap();

        assert_eq!(config.default_api_version().as_ref(), "v1.0");
        assert!(!config.beta_mode());
        assert!(config.api_base_url().is_none());
        assert!(matches!(config.http_client_handler(), HttpClientHandler::Reqwest));
        assert!(matches!(
            config.persistent_data_backend(),
            PersistentDataBackend::Memory
        ));
        assert!(config.request_context().current_url().is_none());
        assert!(config.default_access_token().is_none());
    }

    #[test]
    fn test_builder_sets_default_access_token_from_string() {
        let config = builder().default_access_token("foo_token").build().unwrap();
        assert_eq!(config.default_access_token().unwrap().value(), "foo_token");
    }

    #[test]
    fn test_builder_trims_trailing_slash_from_base_url() {
        let config = builder()
            .api_base_url("http://127.0.0.1:8080/")
            .build()
            .unwrap();
        assert_eq!(config.api_base_url(), Some("http://127.0.0.1:8080"));
    }

    #[test]
    fn test_builder_rejects_relative_base_url() {
        let result = builder().api_base_url("api.example.com").build();
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SdkConfig>();
    }

    #[test]
    fn test_config_debug_does_not_leak_secret() {
        let config = builder().build().unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("foo_secret"));
    }
}
