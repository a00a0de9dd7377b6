//! URL helpers and the inbound request context.
//!
//! [`RequestContext`] is the SDK's view of the HTTP request currently being
//! handled by the host application: its URL, query parameters, POST fields
//! and cookies. Helpers that need inbound data (the redirect login flow, the
//! signed-request helpers) read it from an injected context, never from
//! process-wide state.

use std::collections::HashMap;

/// The inbound request currently being served.
///
/// # Example
///
/// ```rust
/// use autoznetwork::RequestContext;
///
/// let context = RequestContext::from_url("https://myapp.example/callback?code=abc&state=xyz")
///     .with_cookie("fbsr_123", "signed.value");
///
/// assert_eq!(context.query_param("code"), Some("abc"));
/// assert_eq!(context.cookie("fbsr_123"), Some("signed.value"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    current_url: Option<String>,
    query: HashMap<String, String>,
    post: HashMap<String, String>,
    cookies: HashMap<String, String>,
}

impl RequestContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context for `url`, taking query parameters from its query string.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let query = query_params(&url).into_iter().collect();
        Self {
            current_url: Some(url),
            query,
            ..Self::default()
        }
    }

    /// Sets the current URL without touching the query parameters.
    #[must_use]
    pub fn with_current_url(mut self, url: impl Into<String>) -> Self {
        self.current_url = Some(url.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Adds a POST field.
    #[must_use]
    pub fn with_post_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.post.insert(key.into(), value.into());
        self
    }

    /// Adds a cookie.
    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// The URL of the inbound request.
    #[must_use]
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// A query parameter of the inbound request.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// A POST field of the inbound request.
    #[must_use]
    pub fn post_param(&self, key: &str) -> Option<&str> {
        self.post.get(key).map(String::as_str)
    }

    /// A cookie of the inbound request.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

/// Percent-encodes a string for `application/x-www-form-urlencoded` data.
///
/// Spaces become `+`.
#[must_use]
pub fn form_urlencode(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}

/// Decodes one `application/x-www-form-urlencoded` component.
///
/// Invalid UTF-8 sequences leave the component undecoded.
#[must_use]
pub fn form_urldecode(value: &str) -> String {
    let spaced = value.replace('+', " ");
    urlencoding::decode(&spaced).map_or(spaced.clone(), |decoded| decoded.into_owned())
}

/// Parses a query string (without the leading `?`) into decoded pairs.
#[must_use]
pub fn parse_query_string(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (form_urldecode(key), form_urldecode(value))
        })
        .collect()
}

/// Returns the decoded query parameters of `url`.
#[must_use]
pub fn query_params(url: &str) -> Vec<(String, String)> {
    let (_, query, _) = split_url(url);
    query.map(parse_query_string).unwrap_or_default()
}

/// Removes the named query parameters from `url`.
///
/// Remaining parameters keep their original order and encoding. The `?`
/// is dropped when no parameters remain.
///
/// ```rust
/// use autoznetwork::url::remove_params_from_url;
///
/// let url = remove_params_from_url("http://a.zzz/?state=1&code=2&keep=3", &["code", "state"]);
/// assert_eq!(url, "http://a.zzz/?keep=3");
/// ```
#[must_use]
pub fn remove_params_from_url(url: &str, params_to_remove: &[&str]) -> String {
    let (base, query, fragment) = split_url(url);
    let Some(query) = query else {
        return url.to_string();
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split_once('=').map_or(*pair, |(k, _)| k);
            !params_to_remove.contains(&form_urldecode(key).as_str())
        })
        .collect();

    let mut result = base.to_string();
    if !kept.is_empty() {
        result.push('?');
        result.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        result.push('#');
        result.push_str(fragment);
    }
    result
}

/// Merges an already-encoded query string into the query of `url`.
///
/// Keys already present in `url` take the new value in place; new keys are
/// appended in order.
///
/// ```rust
/// use autoznetwork::url::append_query_to_url;
///
/// let url = append_query_to_url("/v1.0/foo?a=1&b=2", "b=3&c=4");
/// assert_eq!(url, "/v1.0/foo?a=1&b=3&c=4");
/// ```
#[must_use]
pub fn append_query_to_url(url: &str, encoded_query: &str) -> String {
    if encoded_query.is_empty() {
        return url.to_string();
    }
    let (base, query, fragment) = split_url(url);

    let query = match query.filter(|query| !query.is_empty()) {
        None => encoded_query.to_string(),
        Some(existing) => {
            let mut merged = parse_query_string(existing);
            for (key, value) in parse_query_string(encoded_query) {
                match merged.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => merged.push((key, value)),
                }
            }
            merged
                .iter()
                .map(|(key, value)| format!("{}={}", form_urlencode(key), form_urlencode(value)))
                .collect::<Vec<_>>()
                .join("&")
        }
    };

    let mut result = format!("{base}?{query}");
    if let Some(fragment) = fragment {
        result.push('#');
        result.push_str(fragment);
    }
    result
}

/// Ensures a non-empty path starts with `/`.
#[must_use]
pub fn force_slash_prefix(value: &str) -> String {
    if value.is_empty() || value.starts_with('/') {
        value.to_string()
    } else {
        format!("/{value}")
    }
}

fn split_url(url: &str) -> (&str, Option<&str>, Option<&str>) {
    let (rest, fragment) = match url.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (url, None),
    };
    match rest.split_once('?') {
        Some((base, query)) => (base, Some(query), fragment),
        None => (rest, None, fragment),
    }
}
