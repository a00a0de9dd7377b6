use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;

use crate::clients::{HttpMethod, HttpTransport, RawResponse, TransportError};

/// Transport backed by a pooled [`reqwest::Client`] using rustls.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a new `reqwest` client.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] if TLS initialization fails.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;
        Ok(Self { client })
    }

    /// Creates a transport around an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        url: &str,
        method: HttpMethod,
        body: Vec<u8>,
        headers: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let method = match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut req_builder = self.client.request(method, url).timeout(timeout);
        for (key, value) in headers {
            req_builder = req_builder.header(key, value);
        }
        if !body.is_empty() {
            req_builder = req_builder.body(body);
        }

        let res = req_builder.send().await.map_err(|e| timeout_or(e, timeout))?;

        let http_status = res.status().as_u16();
        let mut res_headers = HashMap::new();
        for (name, value) in res.headers() {
            res_headers.insert(
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            );
        }
        let body = res.text().await.map_err(|e| timeout_or(e, timeout))?;

        Ok(RawResponse::new(http_status, res_headers, body))
    }
}

fn timeout_or(error: reqwest::Error, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            seconds: timeout.as_secs(),
        }
    } else {
        TransportError::Network(error)
    }
}
