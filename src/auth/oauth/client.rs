//! OAuth 2.0 client for the AutozNetwork API.
//!
//! [`OAuth2Client`] builds authorization dialog URLs and performs the
//! token exchanges of the authorization code flow.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Duration, Utc};
use serde_json::{Map, Value};

use crate::auth::{AccessToken, AccessTokenMetadata, AuthError};
use crate::clients::{ApiRequest, ApiResponse, AutozClient, HttpMethod, Params, SDK_VERSION};
use crate::config::{ApiVersion, App};
use crate::error::Error;
use crate::url::form_urlencode;

/// Base URL of the authorization dialog and logout page.
pub const BASE_AUTHORIZATION_URL: &str = "https://www.autoznetwork.com";

/// OAuth 2.0 client bound to one app.
///
/// Token endpoints are called with the app access token (`{id}|{secret}`)
/// unless stated otherwise, and always receive `client_id` and
/// `client_secret`. Every call records its request, available from
/// [`last_request`](Self::last_request).
///
/// # Example
///
/// ```rust,ignore
/// use autoznetwork::auth::oauth::OAuth2Client;
///
/// let oauth = OAuth2Client::new(app, client, ApiVersion::default());
///
/// let url = oauth.authorization_url(
///     "https://myapp.example/callback",
///     "random-state",
///     &["email"],
///     Params::new(),
///     "&",
/// );
///
/// // After the redirect back:
/// let token = oauth.access_token_from_code("code-from-query", "https://myapp.example/callback").await?;
/// ```
#[derive(Debug)]
pub struct OAuth2Client {
    app: App,
    client: Arc<AutozClient>,
    api_version: ApiVersion,
    last_request: Mutex<Option<ApiRequest>>,
}

impl OAuth2Client {
    /// Creates an OAuth client.
    #[must_use]
    pub const fn new(app: App, client: Arc<AutozClient>, api_version: ApiVersion) -> Self {
        Self {
            app,
            client,
            api_version,
            last_request: Mutex::new(None),
        }
    }

    /// The app this client acts for.
    #[must_use]
    pub const fn app(&self) -> &App {
        &self.app
    }

    /// The API version used in URLs.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// The most recent request sent by this client.
    #[must_use]
    pub fn last_request(&self) -> Option<ApiRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Builds the URL of the authorization dialog.
    ///
    /// The query carries `client_id`, `state`, `response_type=code`, `sdk`,
    /// `redirect_uri` and `scope` (comma-separated). `extra_params` come
    /// first; where they name one of those keys, the fixed value replaces
    /// theirs. Pairs are joined with `separator`.
    #[must_use]
    pub fn authorization_url(
        &self,
        redirect_url: &str,
        state: &str,
        scopes: &[&str],
        extra_params: Params,
        separator: &str,
    ) -> String {
        let app_id: &str = self.app.id().as_ref();
        let mut params = extra_params;
        params.insert("client_id", app_id);
        params.insert("state", state);
        params.insert("response_type", "code");
        params.insert("sdk", format!("rust-sdk-{SDK_VERSION}"));
        params.insert("redirect_uri", redirect_url);
        params.insert("scope", scopes.join(","));

        let query = params
            .flatten()
            .iter()
            .map(|(key, value)| format!("{}={}", form_urlencode(key), form_urlencode(value)))
            .collect::<Vec<_>>()
            .join(separator);

        format!(
            "{BASE_AUTHORIZATION_URL}/{}/dialog/oauth?{query}",
            self.api_version
        )
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingAccessToken`] if the response has no
    /// `access_token`, or any error from sending the request.
    pub async fn access_token_from_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, Error> {
        let params = Params::new()
            .with("code", code)
            .with("redirect_uri", redirect_uri);
        self.request_an_access_token(params).await
    }

    /// Exchanges a short-lived access token for a long-lived one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingAccessToken`] if the response has no
    /// `access_token`, or any error from sending the request.
    pub async fn long_lived_access_token(
        &self,
        access_token: impl AsRef<str> + Send,
    ) -> Result<AccessToken, Error> {
        let params = Params::new()
            .with("grant_type", "fb_exchange_token")
            .with("fb_exchange_token", access_token.as_ref());
        self.request_an_access_token(params).await
    }

    /// Fetches a client code for a long-lived access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCode`] if the response has no `code`, or
    /// any error from sending the request.
    pub async fn code_from_long_lived_access_token(
        &self,
        access_token: impl Into<AccessToken> + Send,
        redirect_uri: &str,
    ) -> Result<String, Error> {
        let params = Params::new().with("redirect_uri", redirect_uri);
        let response = self
            .send_request_with_client_params("/oauth/client_code", params, Some(access_token.into()))
            .await?;

        value_to_string(response.decoded_body().get("code"))
            .ok_or_else(|| AuthError::MissingCode.into())
    }

    /// Fetches metadata describing `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidMetadata`] if the response has no `data`
    /// object, or any error from sending the request.
    pub async fn debug_token(
        &self,
        access_token: impl AsRef<str> + Send,
    ) -> Result<AccessTokenMetadata, Error> {
        let request = ApiRequest::builder(self.app.clone())
            .access_token(self.app.access_token())
            .method(HttpMethod::Get)
            .endpoint("/debug_token")
            .params(Params::new().with("input_token", access_token.as_ref()))
            .api_version(self.api_version.clone())
            .build()?;

        let response = self.send(request).await?;
        Ok(AccessTokenMetadata::new(&Value::Object(
            response.decoded_body().clone(),
        ))?)
    }

    async fn request_an_access_token(&self, params: Params) -> Result<AccessToken, Error> {
        let response = self
            .send_request_with_client_params("/oauth/access_token", params, None)
            .await?;
        let data = response.decoded_body();

        let value = value_to_string(data.get("access_token")).ok_or(AuthError::MissingAccessToken)?;
        let expires_at = expires_in(data).map(|seconds| Utc::now() + Duration::seconds(seconds));

        tracing::debug!(
            endpoint = response.request().endpoint(),
            has_expiry = expires_at.is_some(),
            "Received access token"
        );

        Ok(AccessToken::new(value, expires_at))
    }

    async fn send_request_with_client_params(
        &self,
        endpoint: &str,
        mut params: Params,
        access_token: Option<AccessToken>,
    ) -> Result<ApiResponse, Error> {
        params.merge_missing(self.client_params());
        let access_token = access_token.unwrap_or_else(|| self.app.access_token());

        let request = ApiRequest::builder(self.app.clone())
            .access_token(access_token)
            .method(HttpMethod::Get)
            .endpoint(endpoint)
            .params(params)
            .api_version(self.api_version.clone())
            .build()?;

        self.send(request).await
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, Error> {
        *self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(request.clone());
        self.client.send_request(request).await
    }

    fn client_params(&self) -> Params {
        let app_id: &str = self.app.id().as_ref();
        let app_secret: &str = self.app.secret().as_ref();
        Params::new()
            .with("client_id", app_id)
            .with("client_secret", app_secret)
    }
}

/// The token lifetime in seconds: a usable `expires`, else `expires_in`.
fn expires_in(data: &Map<String, Value>) -> Option<i64> {
    ["expires", "expires_in"]
        .iter()
        .find_map(|key| match data.get(*key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
}

fn value_to_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
