//! # AutozNetwork Rust SDK
//!
//! An async Rust SDK for the AutozNetwork API, providing OAuth login flows,
//! request signing and an HTTP client with interchangeable transports.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`SdkConfig`] and [`SdkConfigBuilder`]
//! - Validated newtypes for app credentials and API versions
//! - The [`AutozNetwork`] facade for `get`/`post`/`delete` calls
//! - OAuth 2.0 authorization code flow via [`auth::oauth::OAuth2Client`]
//! - Redirect login with CSRF protection via [`helpers::RedirectLoginHelper`]
//! - Signed-request verification via [`SignedRequest`]
//! - Pluggable HTTP transports via [`clients::HttpClientHandler`]
//!
//! ## Quick Start
//!
//! ```rust
//! use autoznetwork::{SdkConfig, AppId, AppSecret, ApiVersion};
//!
//! let config = SdkConfig::builder()
//!     .app_id(AppId::new("123").unwrap())
//!     .app_secret(AppSecret::new("your-app-secret").unwrap())
//!     .default_api_version(ApiVersion::new("v1.0").unwrap())
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Making API Requests
//!
//! ```rust,ignore
//! use autoznetwork::{AutozNetwork, Params};
//!
//! let mut autoz = AutozNetwork::new(config)?;
//! autoz.set_default_access_token("user-access-token");
//!
//! let response = autoz.get("/me", None).await?;
//! println!("{:?}", response.decoded_body());
//!
//! let photo = autoz.file_to_upload("./photo.jpg")?;
//! autoz
//!     .post("/me/photos", Params::new().with("source", photo), None)
//!     .await?;
//! ```
//!
//! ## Login
//!
//! ```rust,ignore
//! use autoznetwork::{AutozNetwork, RequestContext, SdkConfig};
//!
//! // 1. Send the user to the login dialog
//! let helper = autoz.redirect_login_helper();
//! let login_url = helper.login_url("https://myapp.example/callback", &["email"], "&");
//!
//! // 2. On the callback, build the SDK with the inbound request
//! let config = SdkConfig::builder()
//!     .request_context(RequestContext::from_url(callback_url))
//!     .persistent_data_backend(session_backend)
//!     .build()?;
//! let autoz = AutozNetwork::new(config)?;
//! let token = autoz.redirect_login_helper().access_token(None).await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration, inbound request data and request
//!   counters live on instances
//! - **Fail-fast validation**: newtypes and requests validate on construction
//! - **Thread-safe**: clients are `Send + Sync` and shared with `Arc`
//! - **Async-first**: designed for the Tokio runtime

pub mod auth;
mod autoz_network;
pub mod clients;
pub mod config;
pub mod error;
pub mod helpers;
pub mod persistence;
pub mod url;

pub use autoz_network::{AutozNetwork, RequestOptions};

// Re-export public types at crate root for convenience
pub use auth::{AccessToken, AccessTokenMetadata, SignedRequest};
pub use config::{ApiVersion, App, AppId, AppSecret, SdkConfig, SdkConfigBuilder};
pub use error::{ConfigError, Error};
pub use url::RequestContext;

// Re-export HTTP client types
pub use clients::{
    ApiErrorKind, ApiRequest, ApiResponse, AutozClient, HttpMethod, ParamValue, Params,
    ResponseError, UploadFile,
};
