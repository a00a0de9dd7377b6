//! Classification of API error payloads.
//!
//! A response whose decoded body has an `error` key is turned into a
//! [`ResponseError`]. Its [`ApiErrorKind`] is chosen from the error's
//! `error_subcode`, `code` and `type`, in that order of precedence.

use serde_json::{Map, Value};
use thiserror::Error;

/// Message used when the error payload has none.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error from the API.";

const AUTHENTICATION_SUBCODES: [i64; 6] = [458, 459, 460, 463, 464, 467];
const RESUMABLE_UPLOAD_SUBCODES: [i64; 5] = [1_363_030, 1_363_019, 1_363_033, 1_363_021, 1_363_041];
const RESUMABLE_UPLOAD_OFFSET_SUBCODE: i64 = 1_363_037;
const AUTHENTICATION_CODES: [i64; 3] = [100, 102, 190];
const SERVER_CODES: [i64; 2] = [1, 2];
const THROTTLE_CODES: [i64; 5] = [4, 17, 32, 341, 613];
const DUPLICATE_POST_CODE: i64 = 506;

/// The category of an API error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Login status or token expired, revoked or invalid.
    Authentication,
    /// Missing permissions.
    Authorization,
    /// The app or user is being rate limited.
    Throttle,
    /// A server-side issue, possibly downtime.
    Server,
    /// A client-side issue such as a duplicate post.
    Client,
    /// A resumable upload failed; retry from `start_offset`.
    ResumableUpload {
        /// Byte offset to resume from, when provided.
        start_offset: Option<i64>,
        /// Byte offset the resumed chunk should end at, when provided.
        end_offset: Option<i64>,
    },
    /// Any other error.
    Other,
}

impl ApiErrorKind {
    fn classify(code: i64, subcode: Option<i64>, error_type: &str, error: &Value) -> Self {
        if let Some(subcode) = subcode {
            if AUTHENTICATION_SUBCODES.contains(&subcode) {
                return Self::Authentication;
            }
            if RESUMABLE_UPLOAD_SUBCODES.contains(&subcode) {
                return Self::ResumableUpload {
                    start_offset: None,
                    end_offset: None,
                };
            }
            if subcode == RESUMABLE_UPLOAD_OFFSET_SUBCODE {
                let offset = |key: &str| error.get("error_data").and_then(|d| d.get(key)).and_then(as_i64);
                return Self::ResumableUpload {
                    start_offset: offset("start_offset"),
                    end_offset: offset("end_offset"),
                };
            }
        }

        if AUTHENTICATION_CODES.contains(&code) {
            Self::Authentication
        } else if SERVER_CODES.contains(&code) {
            Self::Server
        } else if THROTTLE_CODES.contains(&code) {
            Self::Throttle
        } else if code == DUPLICATE_POST_CODE {
            Self::Client
        } else if code == 10 || (200..=299).contains(&code) {
            Self::Authorization
        } else if error_type == "OAuthException" {
            Self::Authentication
        } else {
            Self::Other
        }
    }
}

/// An error payload returned by the API.
///
/// # Example
///
/// ```rust
/// use autoznetwork::clients::{ApiErrorKind, ResponseError};
/// use serde_json::json;
///
/// let body = json!({"error": {"message": "Bad token", "code": 190, "error_subcode": 463}});
/// let error = ResponseError::from_decoded_body(body.as_object().unwrap(), "", 400);
///
/// assert_eq!(error.kind(), ApiErrorKind::Authentication);
/// assert_eq!(error.code(), 190);
/// assert_eq!(error.subcode(), 463);
/// assert_eq!(error.to_string(), "Bad token");
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}")]
pub struct ResponseError {
    kind: ApiErrorKind,
    message: String,
    code: i64,
    subcode: i64,
    error_type: String,
    http_status: u16,
    raw_body: String,
    data: Map<String, Value>,
}

impl ResponseError {
    /// Classifies the error in a decoded response body.
    ///
    /// When `error.code` is absent but the body has a top-level `code`, the
    /// whole body is treated as the error object.
    #[must_use]
    pub fn from_decoded_body(body: &Map<String, Value>, raw_body: &str, http_status: u16) -> Self {
        let has_error_code = body.get("error").and_then(|e| e.get("code")).is_some();
        let error = if !has_error_code && body.contains_key("code") {
            Value::Object(body.clone())
        } else {
            body.get("error").cloned().unwrap_or(Value::Null)
        };

        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ERROR_MESSAGE)
            .to_string();
        let code = error.get("code").and_then(as_i64);
        let subcode = error.get("error_subcode").and_then(as_i64);
        let error_type = error
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let kind = ApiErrorKind::classify(code.unwrap_or(-1), subcode, &error_type, &error);

        Self {
            kind,
            message,
            code: code.unwrap_or(-1),
            subcode: subcode.unwrap_or(-1),
            error_type,
            http_status,
            raw_body: raw_body.to_string(),
            data: body.clone(),
        }
    }

    /// The error category.
    #[must_use]
    pub const fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The API error code, or `-1`.
    #[must_use]
    pub const fn code(&self) -> i64 {
        self.code
    }

    /// The API error subcode, or `-1`.
    #[must_use]
    pub const fn subcode(&self) -> i64 {
        self.subcode
    }

    /// The error type, such as `OAuthException`, or an empty string.
    #[must_use]
    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    /// The HTTP status of the response.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.http_status
    }

    /// The undecoded response body.
    #[must_use]
    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// The decoded response body.
    #[must_use]
    pub const fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
