//! HTTP client types for AutozNetwork API communication.
//!
//! This module is the request/response layer of the SDK.
//!
//! # Overview
//!
//! - [`ApiRequest`]: one API call, with its credentials, params and uploads
//! - [`ApiResponse`]: a decoded response, with any error payload classified
//! - [`AutozClient`]: sends requests through an [`HttpTransport`]
//! - [`HttpClientHandler`]: selects [`ReqwestTransport`], [`StreamTransport`]
//!   or a custom transport
//! - [`Params`] / [`ParamValue`]: ordered request parameters
//! - [`UploadFile`]: a local file sent as multipart data
//! - [`ResponseError`] / [`ApiErrorKind`]: classified API errors
//!
//! # Example
//!
//! ```rust,ignore
//! use autoznetwork::clients::{ApiRequest, AutozClient, HttpClientHandler, HttpMethod};
//! use autoznetwork::Params;
//!
//! let client = AutozClient::new(HttpClientHandler::default().into_transport()?, false);
//!
//! let request = ApiRequest::builder(app)
//!     .access_token("user-token")
//!     .method(HttpMethod::Post)
//!     .endpoint("/me/feed")
//!     .params(Params::new().with("message", "Hello"))
//!     .build()?;
//!
//! let response = client.send_request(request).await?;
//! ```
//!
//! # Errors
//!
//! Nothing is retried. Validation failures are returned before any I/O,
//! transport failures are returned as they occur, and an `error` object in
//! a response body becomes [`Error::Api`](crate::Error::Api).

pub(crate) mod body;
mod errors;
mod http_client;
mod http_request;
mod http_response;
mod params;
mod response_error;
mod transport;
mod upload;

pub use body::{url_encode_params, MultipartBody, UrlEncodedBody};
pub use errors::{TransportError, ValidationError};
pub use http_client::{
    AutozClient, PreparedRequest, BASE_REST_API_URL, BASE_REST_API_URL_BETA,
    DEFAULT_FILE_UPLOAD_REQUEST_TIMEOUT, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_VIDEO_UPLOAD_REQUEST_TIMEOUT, SDK_VERSION,
};
pub use http_request::{default_headers, ApiRequest, ApiRequestBuilder, HttpMethod};
pub use http_response::{ApiResponse, API_VERSION_HEADER};
pub use params::{ParamValue, Params};
pub use response_error::{ApiErrorKind, ResponseError, UNKNOWN_ERROR_MESSAGE};
pub use transport::{
    HttpClientHandler, HttpTransport, RawResponse, ReqwestTransport, StreamTransport,
};
pub use upload::{UploadFile, UploadKind};
