//! The SDK entry point.

use std::path::Path;
use std::sync::Arc;

use crate::auth::oauth::{OAuth2Client, PseudoRandomStringGenerator};
use crate::auth::{AccessToken, SignatureError};
use crate::clients::{
    ApiRequest, ApiResponse, AutozClient, HttpMethod, Params, UploadFile, ValidationError,
};
use crate::config::{ApiVersion, App, SdkConfig};
use crate::error::Error;
use crate::helpers::{RedirectLoginHelper, SignedRequestHelper, SignedRequestSource};
use crate::persistence::PersistentDataHandler;
use crate::url::RequestContext;

/// Per-call overrides for [`AutozNetwork::send_request`] and
/// [`AutozNetwork::request`].
///
/// Unset fields fall back to the facade's defaults.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    access_token: Option<AccessToken>,
    etag: Option<String>,
    api_version: Option<ApiVersion>,
}

impl RequestOptions {
    /// Creates options with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `token` instead of the default access token.
    #[must_use]
    pub fn access_token(mut self, token: impl Into<AccessToken>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sends `If-None-Match` with `etag`.
    #[must_use]
    pub fn etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Uses `version` instead of the default API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }
}

impl From<AccessToken> for RequestOptions {
    fn from(token: AccessToken) -> Self {
        Self::new().access_token(token)
    }
}

/// The AutozNetwork SDK.
///
/// Built once from an [`SdkConfig`], it owns the HTTP client, the OAuth
/// client and the login helpers' collaborators.
///
/// # Example
///
/// ```rust,ignore
/// use autoznetwork::{AutozNetwork, SdkConfig, AppId, AppSecret, Params};
///
/// let mut autoz = AutozNetwork::new(
///     SdkConfig::builder()
///         .app_id(AppId::new("123")?)
///         .app_secret(AppSecret::new("secret")?)
///         .build()?,
/// )?;
/// autoz.set_default_access_token("user-token");
///
/// let me = autoz.get("/me", None).await?;
/// println!("{:?}", me.decoded_body());
///
/// autoz.post("/me/feed", Params::new().with("message", "Hello"), None).await?;
/// ```
#[derive(Debug)]
pub struct AutozNetwork {
    app: App,
    client: Arc<AutozClient>,
    oauth2_client: Arc<OAuth2Client>,
    default_api_version: ApiVersion,
    default_access_token: Option<AccessToken>,
    persistent_data_handler: Arc<dyn PersistentDataHandler>,
    random_string_generator: Arc<dyn PseudoRandomStringGenerator>,
    request_context: RequestContext,
}

// Verify AutozNetwork is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AutozNetwork>();
};

impl AutozNetwork {
    /// Creates the SDK from `config`, resolving its handler choices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP transport cannot be created.
    pub fn new(config: SdkConfig) -> Result<Self, Error> {
        let transport = config.http_client_handler().clone().into_transport()?;
        let mut client = AutozClient::new(transport, config.beta_mode());
        if let Some(base_url) = config.api_base_url() {
            client = client.with_base_url(base_url);
        }
        let client = Arc::new(client);

        let app = config.app().clone();
        let default_api_version = config.default_api_version().clone();
        let oauth2_client = Arc::new(OAuth2Client::new(
            app.clone(),
            Arc::clone(&client),
            default_api_version.clone(),
        ));

        tracing::debug!(
            app_id = %app.id(),
            api_version = %default_api_version,
            beta_mode = config.beta_mode(),
            "Initialized AutozNetwork SDK"
        );

        Ok(Self {
            app,
            client,
            oauth2_client,
            default_api_version,
            default_access_token: config.default_access_token().cloned(),
            persistent_data_handler: config.persistent_data_backend().clone().into_handler(),
            random_string_generator: config.random_string_generator(),
            request_context: config.request_context().clone(),
        })
    }

    /// Creates the SDK with every setting at its default, taking the app
    /// credentials from `AUTOZNETWORK_APP_ID` and `AUTOZNETWORK_APP_SECRET`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either variable is missing or invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(SdkConfig::builder().build()?)
    }

    /// The app credentials.
    #[must_use]
    pub const fn app(&self) -> &App {
        &self.app
    }

    /// The HTTP client.
    #[must_use]
    pub const fn client(&self) -> &Arc<AutozClient> {
        &self.client
    }

    /// The OAuth client.
    #[must_use]
    pub const fn oauth2_client(&self) -> &Arc<OAuth2Client> {
        &self.oauth2_client
    }

    /// The API version used when a call does not name one.
    #[must_use]
    pub const fn default_api_version(&self) -> &ApiVersion {
        &self.default_api_version
    }

    /// The access token used when a call does not supply one.
    #[must_use]
    pub const fn default_access_token(&self) -> Option<&AccessToken> {
        self.default_access_token.as_ref()
    }

    /// Sets the access token used when a call does not supply one.
    pub fn set_default_access_token(&mut self, token: impl Into<AccessToken>) {
        self.default_access_token = Some(token.into());
    }

    /// The inbound request the helpers read.
    #[must_use]
    pub const fn request_context(&self) -> &RequestContext {
        &self.request_context
    }

    /// The store for the login flow's CSRF state.
    #[must_use]
    pub fn persistent_data_handler(&self) -> &Arc<dyn PersistentDataHandler> {
        &self.persistent_data_handler
    }

    /// Returns a redirect login helper sharing this instance's state store.
    #[must_use]
    pub fn redirect_login_helper(&self) -> RedirectLoginHelper {
        RedirectLoginHelper::new(
            Arc::clone(&self.oauth2_client),
            Arc::clone(&self.persistent_data_handler),
            Arc::clone(&self.random_string_generator),
            self.request_context.clone(),
        )
    }

    /// Returns a helper reading the JavaScript SDK's `fbsr_<app_id>` cookie.
    ///
    /// # Errors
    ///
    /// Returns a [`SignatureError`] if the cookie holds an invalid signed request.
    pub fn javascript_helper(&self) -> Result<SignedRequestHelper, SignatureError> {
        self.signed_request_helper(&SignedRequestSource::Cookie)
    }

    /// Returns a helper reading a signed request from `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`SignatureError`] if the signed request is invalid.
    pub fn signed_request_helper(
        &self,
        source: &SignedRequestSource,
    ) -> Result<SignedRequestHelper, SignatureError> {
        SignedRequestHelper::new(Arc::clone(&self.oauth2_client), source, &self.request_context)
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`send_request`](Self::send_request).
    pub async fn get(
        &self,
        endpoint: &str,
        access_token: Option<AccessToken>,
    ) -> Result<ApiResponse, Error> {
        self.send_request(HttpMethod::Get, endpoint, Params::new(), options(access_token))
            .await
    }

    /// Sends a POST request.
    ///
    /// # Errors
    ///
    /// See [`send_request`](Self::send_request).
    pub async fn post(
        &self,
        endpoint: &str,
        params: Params,
        access_token: Option<AccessToken>,
    ) -> Result<ApiResponse, Error> {
        self.send_request(HttpMethod::Post, endpoint, params, options(access_token))
            .await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`send_request`](Self::send_request).
    pub async fn delete(
        &self,
        endpoint: &str,
        params: Params,
        access_token: Option<AccessToken>,
    ) -> Result<ApiResponse, Error> {
        self.send_request(HttpMethod::Delete, endpoint, params, options(access_token))
            .await
    }

    /// Builds a request with [`request`](Self::request) and sends it.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`Error::Validation`] if the request is invalid or has no token
    /// - [`Error::Transport`] if the exchange fails
    /// - [`Error::Api`] if the API answers with an error payload
    pub async fn send_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        params: Params,
        options: RequestOptions,
    ) -> Result<ApiResponse, Error> {
        let request = self.request(method, endpoint, params, options)?;
        self.client.send_request(request).await
    }

    /// Builds a request, filling in the default access token and API version.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `endpoint` or `params` carry an
    /// access token different from the one in use.
    pub fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        params: Params,
        options: RequestOptions,
    ) -> Result<ApiRequest, ValidationError> {
        let RequestOptions {
            access_token,
            etag,
            api_version,
        } = options;

        let mut builder = ApiRequest::builder(self.app.clone())
            .maybe_access_token(access_token.or_else(|| self.default_access_token.clone()))
            .method(method)
            .endpoint(endpoint)
            .params(params)
            .api_version(api_version.unwrap_or_else(|| self.default_api_version.clone()));
        if let Some(etag) = etag {
            builder = builder.etag(etag);
        }
        builder.build()
    }

    /// Prepares a local file for upload.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FileNotFound`] if `path` is not a file.
    pub fn file_to_upload(&self, path: impl AsRef<Path>) -> Result<UploadFile, ValidationError> {
        UploadFile::new(path)
    }

    /// Prepares a local video for upload; video uploads get a longer timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FileNotFound`] if `path` is not a file.
    pub fn video_to_upload(&self, path: impl AsRef<Path>) -> Result<UploadFile, ValidationError> {
        UploadFile::video(path)
    }
}

fn options(access_token: Option<AccessToken>) -> RequestOptions {
    access_token.map_or_else(RequestOptions::new, RequestOptions::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpClientHandler;
    use crate::config::{AppId, AppSecret};

    fn autoz() -> AutozNetwork {
        let config = SdkConfig::builder()
            .app_id(AppId::new("123").unwrap())
            .app_secret(AppSecret::new("foo_secret").unwrap())
            .http_client_handler(HttpClientHandler::Stream)
            .build()
            .unwrap();
        AutozNetwork::new(config).unwrap()
    }

    #[test]
    fn test_request_uses_defaults() {
        let mut autoz = autoz();
        autoz.set_default_access_token("foo_token");

        let request = autoz
            .request(HttpMethod::Get, "/me", Params::new(), RequestOptions::new())
            .unwrap();
        assert_eq!(request.access_token(), Some("foo_token"));
        assert_eq!(request.api_version().as_ref(), "v1.0");
        assert_eq!(request.method(), Some(HttpMethod::Get));
    }

    #[test]
    fn test_request_options_override_defaults() {
        let mut autoz = autoz();
        autoz.set_default_access_token("foo_token");

        let options = RequestOptions::new()
            .access_token("other_token")
            .etag("fooETag")
            .api_version(ApiVersion::new("v1337").unwrap());
        let request = autoz
            .request(HttpMethod::Post, "/foo", Params::new(), options)
            .unwrap();
        assert_eq!(request.access_token(), Some("other_token"));
        assert_eq!(request.etag(), Some("fooETag"));
        assert_eq!(request.url().unwrap(), "/v1337/foo");
    }

    #[test]
    fn test_helpers_share_state_store() {
        let autoz = autoz();
        let _ = autoz
            .redirect_login_helper()
            .login_url("https://foo.bar", &[], "&");
        let state = autoz.persistent_data_handler().get("state");
        assert!(state.is_some());

        let again = autoz
            .redirect_login_helper()
            .login_url("https://foo.bar", &[], "&");
        assert!(again.contains(&format!("state={}", state.unwrap())));
    }

    #[test]
    fn test_javascript_helper_without_cookie_is_empty() {
        let helper = autoz().javascript_helper().unwrap();
        assert!(helper.signed_request().is_none());
    }

    #[test]
    fn test_missing_upload_is_rejected() {
        assert!(autoz().file_to_upload("/definitely/not/here.txt").is_err());
    }
}
