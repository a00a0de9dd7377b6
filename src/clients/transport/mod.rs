//! HTTP transports.
//!
//! An [`HttpTransport`] performs one HTTP exchange and returns the raw
//! status, headers and body. Two implementations ship with the SDK:
//!
//! - [`ReqwestTransport`]: a pooled `reqwest` client (the default)
//! - [`StreamTransport`]: HTTP/1.0 over a plain `tokio` TCP stream
//!
//! Applications can plug in their own via [`HttpClientHandler::Custom`].

mod raw_response;
mod reqwest_transport;
mod stream;

pub use raw_response::RawResponse;
pub use reqwest_transport::ReqwestTransport;
pub use stream::StreamTransport;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::clients::{HttpMethod, TransportError};
use crate::error::ConfigError;

/// Sends HTTP requests.
///
/// HTTP error statuses are not transport errors: a 4xx or 5xx response is
/// returned as a [`RawResponse`] so its body can be inspected.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use autoznetwork::clients::{HttpMethod, HttpTransport, RawResponse, TransportError};
/// use std::collections::{BTreeMap, HashMap};
/// use std::time::Duration;
///
/// #[derive(Debug)]
/// struct CannedTransport;
///
/// #[async_trait]
/// impl HttpTransport for CannedTransport {
///     async fn send(
///         &self,
///         _url: &str,
///         _method: HttpMethod,
///         _body: Vec<u8>,
///         _headers: &BTreeMap<String, String>,
///         _timeout: Duration,
///     ) -> Result<RawResponse, TransportError> {
///         Ok(RawResponse::new(200, HashMap::new(), r#"{"id":"1"}"#))
///     }
/// }
/// ```
#[async_trait]
pub trait HttpTransport: Send + Sync + fmt::Debug {
    /// Sends a request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the exchange fails or exceeds `timeout`.
    async fn send(
        &self,
        url: &str,
        method: HttpMethod,
        body: Vec<u8>,
        headers: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError>;
}

/// Which transport an [`AutozClient`](crate::clients::AutozClient) uses.
#[derive(Clone, Debug, Default)]
pub enum HttpClientHandler {
    /// [`ReqwestTransport`].
    #[default]
    Reqwest,
    /// [`StreamTransport`].
    Stream,
    /// A caller-supplied transport.
    Custom(Arc<dyn HttpTransport>),
}

impl HttpClientHandler {
    /// Creates the selected transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] if the `reqwest` client cannot be built.
    pub fn into_transport(self) -> Result<Arc<dyn HttpTransport>, TransportError> {
        Ok(match self {
            Self::Reqwest => Arc::new(ReqwestTransport::new()?),
            Self::Stream => Arc::new(StreamTransport::new()),
            Self::Custom(transport) => transport,
        })
    }
}

impl FromStr for HttpClientHandler {
    type Err = ConfigError;

    /// Parses a handler name. `curl` is accepted as an alias for `reqwest`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reqwest" | "curl" => Ok(Self::Reqwest),
            "stream" => Ok(Self::Stream),
            _ => Err(ConfigError::InvalidHttpClientHandler {
                name: s.to_string(),
            }),
        }
    }
}
