//! Outbound API requests.
//!
//! This module provides [`ApiRequest`], a single call to the API, and its
//! builder. A request owns its parameters and file uploads and produces the
//! canonical URL and body that [`AutozClient`](crate::clients::AutozClient)
//! sends.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::auth::AccessToken;
use crate::clients::body::url_encode_params;
use crate::clients::{
    MultipartBody, ParamValue, Params, UploadFile, UrlEncodedBody, ValidationError, SDK_VERSION,
};
use crate::config::{ApiVersion, App};
use crate::url::{append_query_to_url, force_slash_prefix, query_params, remove_params_from_url};

/// Params that carry credentials. They are never taken from callers
/// verbatim; the request re-applies them from its own token.
const AUTHENTICATION_PARAMS: [&str; 2] = ["access_token", "appsecret_proof"];

/// HTTP methods supported by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP DELETE.
    Delete,
}

impl HttpMethod {
    /// The uppercase method name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "DELETE" => Ok(Self::Delete),
            "" => Err(ValidationError::MissingMethod),
            _ => Err(ValidationError::InvalidMethod {
                method: s.to_string(),
            }),
        }
    }
}

/// Headers sent with every request.
#[must_use]
pub fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("User-Agent".to_string(), format!("autoz-rust-{SDK_VERSION}")),
        ("Accept-Encoding".to_string(), "*".to_string()),
    ])
}

/// A single request to the API.
///
/// # Credentials
///
/// An `access_token` passed as a param, or in the endpoint's query string,
/// is adopted when the request has no token and must match the token
/// otherwise. `access_token` and `appsecret_proof` are then stripped and
/// re-applied by [`params`](Self::params), with the proof recomputed from
/// the app secret.
///
/// # Example
///
/// ```rust
/// use autoznetwork::clients::{ApiRequest, HttpMethod};
/// use autoznetwork::{App, AppId, AppSecret, Params};
///
/// let app = App::new(AppId::new("123").unwrap(), AppSecret::new("foo_secret").unwrap());
/// let request = ApiRequest::builder(app)
///     .access_token("foo_token")
///     .method(HttpMethod::Get)
///     .endpoint("/foo")
///     .params(Params::new().with("foo", "bar"))
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     request.url().unwrap(),
///     "/v1.0/foo?foo=bar&access_token=foo_token\
///      &appsecret_proof=df4256903ba4e23636cc142117aa632133d75c642bd2a68955be1443bd14deb9"
/// );
/// ```
#[derive(Clone, Debug)]
pub struct ApiRequest {
    app: App,
    access_token: Option<String>,
    method: Option<HttpMethod>,
    endpoint: String,
    headers: BTreeMap<String, String>,
    params: Params,
    files: BTreeMap<String, UploadFile>,
    etag: Option<String>,
    api_version: ApiVersion,
}

impl ApiRequest {
    /// Creates a builder for a request made on behalf of `app`.
    #[must_use]
    pub fn builder(app: App) -> ApiRequestBuilder {
        ApiRequestBuilder::new(app)
    }

    /// The app making the request.
    #[must_use]
    pub const fn app(&self) -> &App {
        &self.app
    }

    /// The access token value, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// The access token as an [`AccessToken`], if any.
    #[must_use]
    pub fn access_token_entity(&self) -> Option<AccessToken> {
        self.access_token.as_deref().map(AccessToken::from)
    }

    /// Replaces the access token.
    pub fn set_access_token(&mut self, token: Option<impl Into<AccessToken>>) {
        self.access_token = token
            .map(|t| Into::<AccessToken>::into(t).value().to_string())
            .filter(|t| !t.is_empty());
    }

    /// Adopts `token` if the request has none; otherwise requires it to match.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AccessTokenMismatch`] if a different token is already set.
    pub fn set_access_token_from_params(&mut self, token: &str) -> Result<(), ValidationError> {
        match self.access_token.as_deref() {
            None => {
                self.set_access_token(Some(token));
                Ok(())
            }
            Some(existing) if existing == token => Ok(()),
            Some(_) => Err(ValidationError::AccessTokenMismatch),
        }
    }

    /// The `appsecret_proof` for the current token, if any.
    #[must_use]
    pub fn app_secret_proof(&self) -> Option<String> {
        self.access_token_entity()
            .map(|token| token.app_secret_proof(self.app.secret()))
    }

    /// Fails unless the request has an access token.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingAccessToken`].
    pub fn validate_access_token(&self) -> Result<(), ValidationError> {
        if self.access_token.is_some() {
            Ok(())
        } else {
            Err(ValidationError::MissingAccessToken)
        }
    }

    /// The HTTP method, if set.
    #[must_use]
    pub const fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    /// Sets the HTTP method.
    pub fn set_method(&mut self, method: HttpMethod) {
        self.method = Some(method);
    }

    /// The endpoint, with credentials stripped.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sets the endpoint, harvesting any `access_token` from its query string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AccessTokenMismatch`] if the endpoint's
    /// token conflicts with the request's token.
    pub fn set_endpoint(&mut self, endpoint: &str) -> Result<(), ValidationError> {
        if let Some((_, token)) = query_params(endpoint)
            .into_iter()
            .find(|(key, _)| key == "access_token")
        {
            self.set_access_token_from_params(&token)?;
        }
        self.endpoint = remove_params_from_url(endpoint, &AUTHENTICATION_PARAMS);
        Ok(())
    }

    /// Merges `params` into the request.
    ///
    /// Credentials are checked and stripped and file uploads are moved into
    /// [`files`](Self::files). Remaining keys replace existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AccessTokenMismatch`] if `params` carries a
    /// conflicting `access_token`.
    pub fn set_params(&mut self, mut params: Params) -> Result<(), ValidationError> {
        if let Some(token) = params
            .get("access_token")
            .and_then(ParamValue::to_scalar_string)
        {
            self.set_access_token_from_params(&token)?;
        }
        for key in AUTHENTICATION_PARAMS {
            params.remove(key);
        }

        let mut remaining = Params::new();
        for (key, value) in params {
            match value {
                ParamValue::File(file) => self.add_file(key, file),
                value => remaining.insert(key, value),
            }
        }
        self.dangerously_set_params(remaining);
        Ok(())
    }

    /// Merges `params` without any credential or file handling.
    pub fn dangerously_set_params(&mut self, params: Params) {
        self.params.merge(params);
    }

    /// Adds a file upload.
    pub fn add_file(&mut self, key: impl Into<String>, file: UploadFile) {
        self.files.insert(key.into(), file);
    }

    /// Removes all file uploads.
    pub fn reset_files(&mut self) {
        self.files.clear();
    }

    /// The file uploads, by param name.
    #[must_use]
    pub const fn files(&self) -> &BTreeMap<String, UploadFile> {
        &self.files
    }

    /// Returns `true` if the request uploads any file.
    #[must_use]
    pub fn contains_file_uploads(&self) -> bool {
        !self.files.is_empty()
    }

    /// Returns `true` if the request uploads a video.
    #[must_use]
    pub fn contains_video_uploads(&self) -> bool {
        self.files.values().any(UploadFile::is_video)
    }

    /// The params, with `access_token` and `appsecret_proof` appended when
    /// the request has a token.
    #[must_use]
    pub fn params(&self) -> Params {
        let mut params = self.params.clone();
        if let (Some(token), Some(proof)) = (self.access_token.as_deref(), self.app_secret_proof())
        {
            params.insert("access_token", token);
            params.insert("appsecret_proof", proof);
        }
        params
    }

    /// The params sent in the body: all of them for POST, none otherwise.
    #[must_use]
    pub fn post_params(&self) -> Params {
        if self.method == Some(HttpMethod::Post) {
            self.params()
        } else {
            Params::new()
        }
    }

    /// The ETag sent as `If-None-Match`, if any.
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// Sets the ETag.
    pub fn set_etag(&mut self, etag: Option<String>) {
        self.etag = etag;
    }

    /// The API version used in the URL path.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Merges extra headers, replacing existing names.
    pub fn set_headers(&mut self, headers: impl IntoIterator<Item = (String, String)>) {
        self.headers.extend(headers);
    }

    /// All headers to send: extra headers, then the defaults, then
    /// `If-None-Match` when an ETag is set.
    #[must_use]
    pub fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = self.headers.clone();
        headers.extend(default_headers());
        if let Some(etag) = &self.etag {
            headers.insert("If-None-Match".to_string(), etag.clone());
        }
        headers
    }

    /// The path and query relative to the API base URL, e.g. `/v1.0/me?fields=id`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingMethod`] if no method is set.
    pub fn url(&self) -> Result<String, ValidationError> {
        let method = self.method.ok_or(ValidationError::MissingMethod)?;
        let url = format!(
            "{}{}",
            force_slash_prefix(self.api_version.as_ref()),
            force_slash_prefix(&self.endpoint)
        );

        if method == HttpMethod::Post {
            Ok(url)
        } else {
            Ok(append_query_to_url(&url, &url_encode_params(&self.params())))
        }
    }

    /// The URL-encoded body built from [`post_params`](Self::post_params).
    #[must_use]
    pub fn url_encoded_body(&self) -> UrlEncodedBody {
        UrlEncodedBody::new(&self.post_params())
    }

    /// The multipart body built from [`post_params`](Self::post_params) and the files.
    #[must_use]
    pub fn multipart_body(&self) -> MultipartBody {
        MultipartBody::new(self.post_params(), self.files.clone())
    }
}

/// Builder for [`ApiRequest`].
///
/// Values are applied in a fixed order on [`build`](Self::build): token,
/// method, endpoint, params. That order decides which `access_token` wins.
#[derive(Debug)]
pub struct ApiRequestBuilder {
    app: App,
    access_token: Option<AccessToken>,
    method: Option<HttpMethod>,
    endpoint: String,
    params: Params,
    etag: Option<String>,
    api_version: Option<ApiVersion>,
    headers: BTreeMap<String, String>,
}

impl ApiRequestBuilder {
    fn new(app: App) -> Self {
        Self {
            app,
            access_token: None,
            method: None,
            endpoint: String::new(),
            params: Params::new(),
            etag: None,
            api_version: None,
            headers: BTreeMap::new(),
        }
    }

    /// Sets the access token.
    #[must_use]
    pub fn access_token(mut self, token: impl Into<AccessToken>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the access token if `token` is `Some`.
    #[must_use]
    pub fn maybe_access_token(mut self, token: Option<AccessToken>) -> Self {
        self.access_token = token;
        self
    }

    /// Sets the HTTP method.
    #[must_use]
    pub const fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the params.
    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Sets the ETag.
    #[must_use]
    pub fn etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Sets the API version. Defaults to `v1.0`.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Adds an extra header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AccessTokenMismatch`] if the endpoint or
    /// params carry a token that differs from the configured one.
    pub fn build(self) -> Result<ApiRequest, ValidationError> {
        let mut request = ApiRequest {
            app: self.app,
            access_token: None,
            method: self.method,
            endpoint: String::new(),
            headers: self.headers,
            params: Params::new(),
            files: BTreeMap::new(),
            etag: self.etag,
            api_version: self.api_version.unwrap_or_default(),
        };
        request.set_access_token(self.access_token);
        request.set_endpoint(&self.endpoint)?;
        request.set_params(self.params)?;
        Ok(request)
    }
}
