use std::collections::HashMap;

/// The status, headers and body returned by an [`HttpTransport`](super::HttpTransport).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    http_status: u16,
    headers: HashMap<String, String>,
    body: String,
}

impl RawResponse {
    /// Creates a response from already-parsed parts.
    #[must_use]
    pub fn new(http_status: u16, headers: HashMap<String, String>, body: impl Into<String>) -> Self {
        Self {
            http_status,
            headers,
            body: body.into(),
        }
    }

    /// Creates a response from a raw header block such as
    /// `"HTTP/1.1 200 OK\r\nEtag: \"abc\"\r\n\r\n"`.
    ///
    /// When several header blocks are present (a proxy's
    /// `Connection established` block, or a `100 Continue`), only the last
    /// block that starts with a status line is used. Header lines are split
    /// on the first `": "` so values containing colons stay intact. The
    /// status is `0` when there is no status line.
    ///
    /// ```rust
    /// use autoznetwork::clients::RawResponse;
    ///
    /// let raw = "HTTP/1.0 200 Connection established\r\nProxy-agent: Kerio\r\n\r\n\
    ///            HTTP/1.1 404 Not Found\r\nX-Trace: a: b\r\n\r\n";
    /// let response = RawResponse::from_raw_headers(raw, "");
    ///
    /// assert_eq!(response.http_status(), 404);
    /// assert_eq!(response.headers().get("X-Trace").map(String::as_str), Some("a: b"));
    /// assert!(response.headers().get("Proxy-agent").is_none());
    /// ```
    #[must_use]
    pub fn from_raw_headers(raw_headers: &str, body: impl Into<String>) -> Self {
        let normalized = raw_headers.replace("\r\n", "\n");
        let blocks: Vec<&str> = normalized
            .split("\n\n")
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .collect();
        let block = blocks
            .iter()
            .rev()
            .find(|block| block.starts_with("HTTP/"))
            .or_else(|| blocks.last())
            .copied()
            .unwrap_or_default();

        let mut http_status = 0;
        let mut headers = HashMap::new();
        for line in block.lines() {
            if line.starts_with("HTTP/") {
                http_status = parse_status_line(line).unwrap_or_default();
            } else if let Some((name, value)) = line.split_once(": ") {
                headers.insert(name.trim().to_string(), value.trim().to_string());
            }
        }

        Self::new(http_status, headers, body)
    }

    /// The HTTP status.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.http_status
    }

    /// The response headers.
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// The response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Splits the response into its parts.
    #[must_use]
    pub fn into_parts(self) -> (u16, HashMap<String, String>, String) {
        (self.http_status, self.headers, self.body)
    }
}

/// Parses `HTTP/1.0 200 OK`, `HTTP/1.1 200 OK` or `HTTP/2 200`.
fn parse_status_line(line: &str) -> Option<u16> {
    line.split_whitespace().nth(1)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROXY_HEADER: &str =
        "HTTP/1.0 200 Connection established\nProxy-agent: Kerio Control/7.1.1 build 1971\r\n\r\n";
    const RAW_HEADER: &str = "HTTP/1.1 200 OK\n\
        Etag: \"9d86b21aa74d74e574bbb35ba13524a52deb96e3\"\n\
        Content-Type: text/javascript; charset=UTF-8\n\
        X-FB-Rev: 9244768\n\
        Date: Mon, 19 May 2014 18:37:17 GMT\n\
        X-FB-Debug: 02QQiffE7JG2rV6i/Agzd0gI2/OOQ2lk5UW0=\n\
        Access-Control-Allow-Origin: *\r\n\r\n";

    fn expected_headers() -> HashMap<String, String> {
        [
            ("Etag", "\"9d86b21aa74d74e574bbb35ba13524a52deb96e3\""),
            ("Content-Type", "text/javascript; charset=UTF-8"),
            ("X-FB-Rev", "9244768"),
            ("Date", "Mon, 19 May 2014 18:37:17 GMT"),
            ("X-FB-Debug", "02QQiffE7JG2rV6i/Agzd0gI2/OOQ2lk5UW0="),
            ("Access-Control-Allow-Origin", "*"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_headers_from_a_string() {
        let response = RawResponse::from_raw_headers(RAW_HEADER, "");
        assert_eq!(response.headers(), &expected_headers());
        assert_eq!(response.http_status(), 200);
    }

    #[test]
    fn test_proxy_headers_are_ignored() {
        let raw = format!("{PROXY_HEADER}{RAW_HEADER}");
        let response = RawResponse::from_raw_headers(&raw, "");
        assert_eq!(response.headers(), &expected_headers());
        assert_eq!(response.http_status(), 200);
    }

    #[test]
    fn test_json_header_values_stay_intact() {
        let response = RawResponse::from_raw_headers(
            r#"x-fb-ads-insights-throttle: {"app_id_util_pct": 0.00,"acc_id_util_pct": 0.00}"#,
            "",
        );
        assert_eq!(
            response.headers().get("x-fb-ads-insights-throttle").map(String::as_str),
            Some(r#"{"app_id_util_pct": 0.00,"acc_id_util_pct": 0.00}"#)
        );
        assert_eq!(response.http_status(), 0);
    }

    #[test]
    fn test_status_line_versions() {
        for version in ["HTTP/1.0", "HTTP/1.1", "HTTP/2"] {
            let raw = RAW_HEADER.replace("HTTP/1.1", version);
            assert_eq!(RawResponse::from_raw_headers(&raw, "").http_status(), 200, "{version}");
        }
    }

    #[test]
    fn test_continue_block_is_skipped() {
        let raw = "HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 201 Created\r\nLocation: /x\r\n\r\n";
        let response = RawResponse::from_raw_headers(raw, "{}");
        assert_eq!(response.http_status(), 201);
        assert_eq!(response.body(), "{}");
    }
}
