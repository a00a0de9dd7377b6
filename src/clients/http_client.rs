//! HTTP client for AutozNetwork API communication.
//!
//! This module provides [`AutozClient`], which turns an [`ApiRequest`] into
//! an HTTP exchange over the configured [`HttpTransport`] and wraps the
//! result in an [`ApiResponse`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::clients::{ApiRequest, ApiResponse, HttpMethod, HttpTransport, ValidationError};
use crate::error::Error;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Production REST API base URL.
pub const BASE_REST_API_URL: &str = "http://api.autoznetwork.com";

/// Beta REST API base URL.
pub const BASE_REST_API_URL_BETA: &str = "http://api.beta.autoznetwork.com";

/// Timeout for requests without uploads, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 60;

/// Timeout for requests uploading files, in seconds.
pub const DEFAULT_FILE_UPLOAD_REQUEST_TIMEOUT: u64 = 3600;

/// Timeout for requests uploading videos, in seconds.
pub const DEFAULT_VIDEO_UPLOAD_REQUEST_TIMEOUT: u64 = 7200;

/// A request ready to hand to a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Absolute URL.
    pub url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Headers, including `Content-Type`.
    pub headers: BTreeMap<String, String>,
    /// Encoded body.
    pub body: Vec<u8>,
}

/// Client for sending [`ApiRequest`]s.
///
/// The client:
/// - picks the production or beta base URL (or a configured override)
/// - encodes the body as URL-encoded or multipart
/// - picks a timeout long enough for uploads
/// - returns API error payloads as [`Error::Api`]
///
/// # Thread Safety
///
/// `AutozClient` is `Send + Sync`. Share it across tasks with `Arc`. The
/// request counter is per instance.
///
/// # Example
///
/// ```rust,ignore
/// use autoznetwork::clients::{ApiRequest, AutozClient, HttpClientHandler, HttpMethod};
///
/// let client = AutozClient::new(HttpClientHandler::Reqwest.into_transport()?, false);
/// let request = ApiRequest::builder(app)
///     .access_token("user-token")
///     .method(HttpMethod::Get)
///     .endpoint("/me")
///     .build()?;
///
/// let response = client.send_request(request).await?;
/// println!("{:?}", response.decoded_body());
/// ```
#[derive(Debug)]
pub struct AutozClient {
    transport: Arc<dyn HttpTransport>,
    beta_mode: bool,
    base_url_override: Option<String>,
    request_count: AtomicU64,
}

// Verify AutozClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AutozClient>();
};

impl AutozClient {
    /// Creates a client sending through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, beta_mode: bool) -> Self {
        Self {
            transport,
            beta_mode,
            base_url_override: None,
            request_count: AtomicU64::new(0),
        }
    }

    /// Sends every request to `base_url` instead of the production or beta URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    /// The transport in use.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Returns `true` if requests go to the beta API.
    #[must_use]
    pub const fn beta_mode(&self) -> bool {
        self.beta_mode
    }

    /// The base URL requests are sent to.
    #[must_use]
    pub fn base_rest_url(&self) -> &str {
        match &self.base_url_override {
            Some(url) => url,
            None if self.beta_mode => BASE_REST_API_URL_BETA,
            None => BASE_REST_API_URL,
        }
    }

    /// The number of requests this client has completed at the transport level.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Chooses the timeout for `request`.
    #[must_use]
    pub fn timeout_for(request: &ApiRequest) -> Duration {
        let seconds = if request.contains_video_uploads() {
            DEFAULT_VIDEO_UPLOAD_REQUEST_TIMEOUT
        } else if request.contains_file_uploads() {
            DEFAULT_FILE_UPLOAD_REQUEST_TIMEOUT
        } else {
            DEFAULT_REQUEST_TIMEOUT
        };
        Duration::from_secs(seconds)
    }

    /// Builds the URL, headers and body for `request`.
    ///
    /// Requests with uploads are encoded as `multipart/form-data`; all
    /// others as `application/x-www-form-urlencoded`. The chosen
    /// `Content-Type` is recorded on the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the method is missing or an upload
    /// cannot be read.
    pub fn prepare_request_message(&self, request: &mut ApiRequest) -> Result<PreparedRequest, Error> {
        let url = format!("{}{}", self.base_rest_url(), request.url()?);
        let method = request.method().ok_or(ValidationError::MissingMethod)?;

        let (content_type, body) = if request.contains_file_uploads() {
            let multipart = request.multipart_body();
            (multipart.content_type(), multipart.body()?)
        } else {
            (
                "application/x-www-form-urlencoded".to_string(),
                request.url_encoded_body().into_bytes(),
            )
        };
        request.set_headers([("Content-Type".to_string(), content_type)]);

        Ok(PreparedRequest {
            url,
            method,
            headers: request.headers(),
            body,
        })
    }

    /// Sends `request` and returns the decoded response.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`Error::Validation`] if the request has no access token or method
    /// - [`Error::Transport`] if the exchange fails
    /// - [`Error::Api`] if the response body is an error payload
    pub async fn send_request(&self, mut request: ApiRequest) -> Result<ApiResponse, Error> {
        request.validate_access_token()?;

        let prepared = self.prepare_request_message(&mut request)?;
        let timeout = Self::timeout_for(&request);

        tracing::debug!(
            method = %prepared.method,
            endpoint = request.endpoint(),
            timeout_secs = timeout.as_secs(),
            "Sending API request"
        );

        let raw = self
            .transport
            .send(
                &prepared.url,
                prepared.method,
                prepared.body,
                &prepared.headers,
                timeout,
            )
            .await?;
        self.request_count.fetch_add(1, Ordering::Relaxed);

        let (http_status, headers, body) = raw.into_parts();
        let response = ApiResponse::new(request, body, http_status, headers);

        if let Some(error) = response.thrown_exception() {
            tracing::warn!(
                code = error.code(),
                subcode = error.subcode(),
                http_status,
                "API returned an error: {}",
                error.message()
            );
        }

        Ok(response.into_result()?)
    }
}
