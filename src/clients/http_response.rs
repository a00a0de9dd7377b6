//! API responses.
//!
//! This module provides [`ApiResponse`], which pairs a transport result
//! with the request that produced it and decodes the body.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::auth::AccessToken;
use crate::clients::{ApiRequest, ResponseError};
use crate::config::App;
use crate::url::parse_query_string;

/// Header carrying the API version that served the request.
pub const API_VERSION_HEADER: &str = "AutozNetwork-API-Version";

/// A response from the API.
///
/// The body is decoded on construction:
///
/// - a JSON object is kept as is
/// - `true`/`false` becomes `{"success": ...}`
/// - a number becomes `{"id": ...}`
/// - `null` or invalid JSON is parsed as a URL-encoded string
/// - anything else becomes `{}`
///
/// A decoded body with an `error` key is classified into a
/// [`ResponseError`], available from [`thrown_exception`](Self::thrown_exception).
/// The response never raises it; [`AutozClient`](crate::clients::AutozClient)
/// returns it as an `Err`.
///
/// # Example
///
/// ```rust
/// use autoznetwork::clients::{ApiRequest, ApiResponse};
/// use autoznetwork::{App, AppId, AppSecret};
/// use std::collections::HashMap;
///
/// let app = App::new(AppId::new("123").unwrap(), AppSecret::new("foo_secret").unwrap());
/// let request = ApiRequest::builder(app).build().unwrap();
///
/// let response = ApiResponse::new(request, "id=123&name=Foo", 200, HashMap::new());
/// assert_eq!(response.decoded_body()["id"], "123");
/// assert!(!response.is_error());
/// ```
#[derive(Clone, Debug)]
pub struct ApiResponse {
    request: ApiRequest,
    body: String,
    http_status: u16,
    headers: HashMap<String, String>,
    decoded_body: Map<String, Value>,
    thrown_exception: Option<ResponseError>,
}

impl ApiResponse {
    /// Creates a response and decodes its body.
    #[must_use]
    pub fn new(
        request: ApiRequest,
        body: impl Into<String>,
        http_status: u16,
        headers: HashMap<String, String>,
    ) -> Self {
        let body = body.into();
        let decoded_body = decode_body(&body);
        let thrown_exception = decoded_body
            .contains_key("error")
            .then(|| ResponseError::from_decoded_body(&decoded_body, &body, http_status));

        Self {
            request,
            body,
            http_status,
            headers,
            decoded_body,
            thrown_exception,
        }
    }

    /// The request that produced this response.
    #[must_use]
    pub const fn request(&self) -> &ApiRequest {
        &self.request
    }

    /// The app that made the request.
    #[must_use]
    pub const fn app(&self) -> &App {
        self.request.app()
    }

    /// The access token the request was made with.
    #[must_use]
    pub fn access_token(&self) -> Option<AccessToken> {
        self.request.access_token_entity()
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

    /// Returns a header by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The raw body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The decoded body.
    #[must_use]
    pub const fn decoded_body(&self) -> &Map<String, Value> {
        &self.decoded_body
    }

    /// The `appsecret_proof` the request was signed with.
    #[must_use]
    pub fn app_secret_proof(&self) -> Option<String> {
        self.request.app_secret_proof()
    }

    /// The `ETag` header.
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.header("ETag")
    }

    /// The API version that served the request.
    #[must_use]
    pub fn api_version(&self) -> Option<&str> {
        self.header(API_VERSION_HEADER)
    }

    /// Returns `true` if the decoded body has an `error` key.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.thrown_exception.is_some()
    }

    /// The classified error, when [`is_error`](Self::is_error) is `true`.
    #[must_use]
    pub const fn thrown_exception(&self) -> Option<&ResponseError> {
        self.thrown_exception.as_ref()
    }

    /// Consumes the response, returning it or its classified error.
    ///
    /// # Errors
    ///
    /// Returns the [`ResponseError`] if the body is an error payload.
    pub fn into_result(self) -> Result<Self, ResponseError> {
        match self.thrown_exception {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }
}

fn decode_body(body: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(Value::Bool(success)) => Map::from_iter([("success".to_string(), Value::Bool(success))]),
        Ok(Value::Number(id)) => Map::from_iter([("id".to_string(), Value::Number(id))]),
        Ok(Value::String(id)) if id.trim().parse::<f64>().is_ok() => {
            Map::from_iter([("id".to_string(), Value::String(id))])
        }
        Ok(Value::Null) | Err(_) => parse_query_string(body)
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
        Ok(_) => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{ApiErrorKind, HttpMethod, Params};
    use crate::config::{AppId, AppSecret};
    use serde_json::json;

    fn request() -> ApiRequest {
        let app = App::new(AppId::new("123").unwrap(), AppSecret::new("foo_secret").unwrap());
        ApiRequest::builder(app)
            .access_token("foo_token")
            .method(HttpMethod::Get)
            .endpoint("/me")
            .params(Params::new().with("foo", "bar"))
            .build()
            .unwrap()
    }

    fn response(body: &str) -> ApiResponse {
        ApiResponse::new(request(), body, 200, HashMap::new())
    }

    #[test]
    fn test_an_etag_can_be_returned_as_a_string() {
        let headers = HashMap::from([("ETag".to_string(), "\"foo_etag\"".to_string())]);
        let response = ApiResponse::new(request(), "", 200, headers);
        assert_eq!(response.etag(), Some("\"foo_etag\""));
    }

    #[test]
    fn test_etag_lookup_ignores_case() {
        let headers = HashMap::from([("etag".to_string(), "\"lower\"".to_string())]);
        let response = ApiResponse::new(request(), "", 200, headers);
        assert_eq!(response.etag(), Some("\"lower\""));
    }

    #[test]
    fn test_a_null_etag_will_return_none() {
        assert!(response("").etag().is_none());
    }

    #[test]
    fn test_api_version_header() {
        let headers = HashMap::from([(API_VERSION_HEADER.to_string(), "v1.0".to_string())]);
        let response = ApiResponse::new(request(), "", 200, headers);
        assert_eq!(response.api_version(), Some("v1.0"));
    }

    #[test]
    fn test_url_encoded_body_is_decoded() {
        let response = response("foo=bar&baz=faz+here");
        assert_eq!(
            Value::Object(response.decoded_body().clone()),
            json!({"foo": "bar", "baz": "faz here"})
        );
    }

    #[test]
    fn test_json_object_is_decoded() {
        let response = response(r#"{"id":"123","name":"Foo"}"#);
        assert_eq!(
            Value::Object(response.decoded_body().clone()),
            json!({"id": "123", "name": "Foo"})
        );
    }

    #[test]
    fn test_boolean_body_becomes_success() {
        assert_eq!(
            Value::Object(response("true").decoded_body().clone()),
            json!({"success": true})
        );
    }

    #[test]
    fn test_numeric_body_becomes_id() {
        assert_eq!(
            Value::Object(response("123456").decoded_body().clone()),
            json!({"id": 123_456})
        );
    }

    #[test]
    fn test_numeric_string_body_becomes_id() {
        assert_eq!(
            Value::Object(response("\"123\"").decoded_body().clone()),
            json!({"id": "123"})
        );
        assert!(response("\"abc\"").decoded_body().is_empty());
    }

    #[test]
    fn test_list_body_becomes_empty() {
        assert!(response("[1,2,3]").decoded_body().is_empty());
    }

    #[test]
    fn test_error_payload_is_classified() {
        let body = json!({
            "error": {
                "message": "Foo error.",
                "type": "OAuthException",
                "code": 190,
                "error_subcode": 463
            }
        })
        .to_string();
        let response = response(&body);

        assert!(response.is_error());
        let error = response.thrown_exception().unwrap();
        assert_eq!(error.kind(), ApiErrorKind::Authentication);
        assert_eq!(error.code(), 190);
        assert_eq!(error.subcode(), 463);
        assert_eq!(error.message(), "Foo error.");
        assert!(response.into_result().is_err());
    }

    #[test]
    fn test_app_secret_proof_comes_from_request() {
        let response = response("{}");
        assert_eq!(
            response.app_secret_proof().as_deref(),
            Some("df4256903ba4e23636cc142117aa632133d75c642bd2a68955be1443bd14deb9")
        );
        assert_eq!(response.access_token().unwrap().value(), "foo_token");
        assert!(response.into_result().is_ok());
    }
}
