//! A dependency-light transport over a plain TCP stream.
//!
//! The request head is written by hand and the whole response is read until
//! the server closes the connection, then split into headers and body.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::clients::{HttpMethod, HttpTransport, RawResponse, TransportError};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Transport that writes HTTP/1.0 directly to a TCP stream.
///
/// Each request opens a fresh connection with `Connection: close` and reads
/// until the server closes it. Only `http://` URLs are supported; use
/// [`ReqwestTransport`](super::ReqwestTransport) for TLS.
#[derive(Clone, Copy, Debug, Default)]
pub struct StreamTransport;

impl StreamTransport {
    /// Creates a stream transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Joins headers into `Name: value` lines.
    #[must_use]
    pub fn compile_header(headers: &BTreeMap<String, String>) -> String {
        headers
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>()
            .join("\r\n")
    }
}

#[async_trait]
impl HttpTransport for StreamTransport {
    async fn send(
        &self,
        url: &str,
        method: HttpMethod,
        body: Vec<u8>,
        headers: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let unsupported = |reason: &str| TransportError::UnsupportedUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let parsed = reqwest::Url::parse(url).map_err(|e| unsupported(&e.to_string()))?;
        if parsed.scheme() != "http" {
            return Err(unsupported("the stream client only supports http:// URLs"));
        }
        let host = parsed.host_str().ok_or_else(|| unsupported("missing host"))?;
        let port = parsed.port_or_known_default().unwrap_or(80);
        let host_header = parsed
            .port()
            .map_or_else(|| host.to_string(), |port| format!("{host}:{port}"));
        let target = match parsed.query() {
            Some(query) => format!("{}?{query}", parsed.path()),
            None => parsed.path().to_string(),
        };

        let mut head = format!("{method} {target} HTTP/1.0\r\nHost: {host_header}\r\n");
        if !headers.is_empty() {
            head.push_str(&Self::compile_header(headers));
            head.push_str("\r\n");
        }
        let _ = write!(
            head,
            "Content-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );

        tracing::debug!(%url, %method, "Sending request over raw stream");

        let exchange = async {
            let mut stream = TcpStream::connect((connect_host(host), port)).await?;
            stream.write_all(head.as_bytes()).await?;
            stream.write_all(&body).await?;
            stream.flush().await?;

            let mut raw = Vec::new();
            stream.read_to_end(&mut raw).await?;
            Ok::<_, std::io::Error>(raw)
        };

        let raw = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| TransportError::Timeout {
                seconds: timeout.as_secs(),
            })??;

        if raw.is_empty() {
            return Err(TransportError::EmptyResponse);
        }

        let (raw_headers, body) = split_response(&raw)?;
        Ok(RawResponse::from_raw_headers(
            &String::from_utf8_lossy(raw_headers),
            String::from_utf8_lossy(body).into_owned(),
        ))
    }
}

/// Splits a response into its header blocks and body.
///
/// Consecutive blocks starting with `HTTP/` (such as a `100 Continue`
/// followed by the final status) all belong to the header section.
fn split_response(raw: &[u8]) -> Result<(&[u8], &[u8]), TransportError> {
    let mut header_end = 0;
    loop {
        let rest = &raw[header_end..];
        if header_end > 0 && !rest.starts_with(b"HTTP/") {
            break;
        }
        let Some(position) = find(rest, HEADER_TERMINATOR) else {
            return Err(TransportError::MalformedResponse {
                reason: "missing end of headers".to_string(),
            });
        };
        header_end += position + HEADER_TERMINATOR.len();
    }
    Ok(raw.split_at(header_end))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// The host to dial: IPv6 literals lose the brackets kept for the `Host` header.
fn connect_host(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_header() {
        let headers = BTreeMap::from([
            ("Accept-Encoding".to_string(), "*".to_string()),
            ("User-Agent".to_string(), "autoz-rust".to_string()),
        ]);
        assert_eq!(
            StreamTransport::compile_header(&headers),
            "Accept-Encoding: *\r\nUser-Agent: autoz-rust"
        );
    }

    #[test]
    fn test_connect_host_strips_ipv6_brackets() {
        assert_eq!(connect_host("[::1]"), "::1");
        assert_eq!(connect_host("127.0.0.1"), "127.0.0.1");
        assert_eq!(connect_host("graph.autoznetwork.com"), "graph.autoznetwork.com");

        let url = reqwest::Url::parse("http://[::1]:8080/v1.0/me").unwrap();
        assert_eq!(connect_host(url.host_str().unwrap()), "::1");
    }

    #[test]
    fn test_split_response() {
        let raw = b"HTTP/1.0 200 OK\r\nA: b\r\n\r\n{\"id\":1}";
        let (headers, body) = split_response(raw).unwrap();
        assert_eq!(headers, b"HTTP/1.0 200 OK\r\nA: b\r\n\r\n");
        assert_eq!(body, b"{\"id\":1}");
    }

    #[test]
    fn test_split_response_with_continue() {
        let raw = b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 200 OK\r\n\r\nbody";
        let (headers, body) = split_response(raw).unwrap();
        assert_eq!(RawResponse::from_raw_headers(&String::from_utf8_lossy(headers), "").http_status(), 200);
        assert_eq!(body, b"body");
    }

    #[test]
    fn test_split_response_without_terminator() {
        assert!(matches!(
            split_response(b"HTTP/1.0 200 OK\r\nA: b"),
            Err(TransportError::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_https_is_unsupported() {
        let result = StreamTransport::new()
            .send(
                "https://api.autoznetwork.com/v1.0/me",
                HttpMethod::Get,
                Vec::new(),
                &BTreeMap::new(),
                Duration::from_secs(1),
            )
            .await;
        assert!(matches!(result, Err(TransportError::UnsupportedUrl { .. })));
    }
}
