//! Signed request parsing and verification.
//!
//! A signed request is `<base64url(signature)>.<base64url(json payload)>`,
//! where the signature is the HMAC-SHA256 of the *encoded* payload segment
//! keyed by the app secret.

use base64::prelude::*;
use serde_json::{Map, Value};

use crate::auth::oauth::hmac::{compute_digest, constant_time_compare};
use crate::auth::SignatureError;

/// The only signing algorithm accepted.
pub const SIGNED_REQUEST_ALGORITHM: &str = "HMAC-SHA256";

/// A verified signed request.
///
/// Construction via [`SignedRequest::parse`] fails unless the payload
/// declares `HMAC-SHA256` and the signature matches, so holding a
/// `SignedRequest` means its payload is authentic.
///
/// # Example
///
/// ```rust
/// use autoznetwork::auth::SignedRequest;
/// use serde_json::json;
///
/// let raw = SignedRequest::make(
///     json!({"user_id": "123", "oauth_token": "foo_token"}).as_object().unwrap().clone(),
///     "foo_app_secret",
/// );
///
/// let signed = SignedRequest::parse(&raw, "foo_app_secret").unwrap();
/// assert_eq!(signed.user_id().as_deref(), Some("123"));
/// assert!(signed.has_oauth_data());
///
/// assert!(SignedRequest::parse(&raw, "wrong_secret").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
    raw: String,
    signature: Vec<u8>,
    payload: Map<String, Value>,
}

impl SignedRequest {
    /// Parses and verifies a raw signed request.
    ///
    /// The payload is decoded first so the declared algorithm can be checked
    /// before any signature work is done.
    ///
    /// # Errors
    ///
    /// Returns a [`SignatureError`] describing the first check that failed.
    pub fn parse(raw: &str, app_secret: &str) -> Result<Self, SignatureError> {
        let (encoded_sig, encoded_payload) = split(raw)?;

        let payload_bytes = base64_url_decode(encoded_payload)
            .ok_or(SignatureError::InvalidEncoding { segment: "payload" })?;
        let payload = match serde_json::from_slice::<Value>(&payload_bytes) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(SignatureError::InvalidPayload {
                    reason: "expected a JSON object".to_string(),
                })
            }
            Err(e) => {
                return Err(SignatureError::InvalidPayload {
                    reason: e.to_string(),
                })
            }
        };

        let algorithm = payload
            .get("algorithm")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if algorithm != SIGNED_REQUEST_ALGORITHM {
            return Err(SignatureError::UnsupportedAlgorithm {
                algorithm: algorithm.to_string(),
            });
        }

        let signature = base64_url_decode(encoded_sig).ok_or(SignatureError::InvalidEncoding {
            segment: "signature",
        })?;
        let expected = compute_digest(encoded_payload.as_bytes(), app_secret);
        if !constant_time_compare(&signature, &expected) {
            tracing::warn!("Rejected signed request with an invalid signature");
            return Err(SignatureError::SignatureMismatch);
        }

        Ok(Self {
            raw: raw.to_string(),
            signature,
            payload,
        })
    }

    /// Creates a signed request string for `payload`.
    ///
    /// `algorithm` is set to `HMAC-SHA256` and `issued_at` to the current
    /// time when absent.
    #[must_use]
    pub fn make(mut payload: Map<String, Value>, app_secret: &str) -> String {
        payload
            .entry("algorithm")
            .or_insert_with(|| Value::from(SIGNED_REQUEST_ALGORITHM));
        payload
            .entry("issued_at")
            .or_insert_with(|| Value::from(chrono::Utc::now().timestamp()));

        let encoded_payload = BASE64_URL_SAFE_NO_PAD.encode(Value::Object(payload).to_string());
        let signature = compute_digest(encoded_payload.as_bytes(), app_secret);
        format!("{}.{encoded_payload}", BASE64_URL_SAFE_NO_PAD.encode(signature))
    }

    /// Returns the original signed request string.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the decoded HMAC-SHA256 signature.
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Returns the decoded payload.
    #[must_use]
    pub const fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Returns a payload field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Returns a payload field as a string, stringifying numbers.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Returns the `user_id` field.
    #[must_use]
    pub fn user_id(&self) -> Option<String> {
        self.get_str("user_id")
    }

    /// Returns `true` if the payload carries a `code` or an `oauth_token`.
    #[must_use]
    pub fn has_oauth_data(&self) -> bool {
        self.payload.contains_key("code") || self.payload.contains_key("oauth_token")
    }
}

fn split(raw: &str) -> Result<(&str, &str), SignatureError> {
    let mut segments = raw.split('.');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(sig), Some(payload), None) if !sig.is_empty() && !payload.is_empty() => {
            Ok((sig, payload))
        }
        _ => Err(SignatureError::Malformed),
    }
}

/// Decodes base64url, tolerating `=` padding and the standard `+`/`/` alphabet.
fn base64_url_decode(input: &str) -> Option<Vec<u8>> {
    let normalized: String = input
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    BASE64_URL_SAFE_NO_PAD.decode(normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "foo_app_secret";
    const WITH_TOKEN: &str = "vdZXlVEQ5NTRRTFvJ7Jeo_kP4SKnBDvbNP0fEYKS0Sg=.eyJvYXV0aF90b2tlbiI6ImZvb190b2tlbiIsImFsZ29yaXRobSI6IkhNQUMtU0hBMjU2IiwiaXNzdWVkX2F0IjoxNDAyNTUxMDMxLCJ1c2VyX2lkIjoiMTIzIn0=";
    const WITH_CODE: &str = "oBtmZlsFguNQvGRETDYQQu1-PhwcArgbBBEK4urbpRA=.eyJjb2RlIjoiZm9vX2NvZGUiLCJhbGdvcml0aG0iOiJITUFDLVNIQTI1NiIsImlzc3VlZF9hdCI6MTQwNjMxMDc1MiwidXNlcl9pZCI6IjEyMyJ9";
    const UNAUTHORIZED: &str = "KPlyhz-whtYAhHWr15N5TkbS_avz-2rUJFpFkfXKC88=.eyJhbGdvcml0aG0iOiJITUFDLVNIQTI1NiIsImlzc3VlZF9hdCI6MTQwMjU1MTA4Nn0=";

    #[test]
    fn test_known_signed_request_with_token_verifies() {
        let signed = SignedRequest::parse(WITH_TOKEN, SECRET).unwrap();
        assert_eq!(signed.get_str("oauth_token").as_deref(), Some("foo_token"));
        assert_eq!(signed.user_id().as_deref(), Some("123"));
        assert_eq!(signed.get("issued_at"), Some(&json!(1_402_551_031)));
        assert!(signed.has_oauth_data());
        assert_eq!(signed.raw(), WITH_TOKEN);
    }

    #[test]
    fn test_known_signed_request_with_code_verifies() {
        let signed = SignedRequest::parse(WITH_CODE, SECRET).unwrap();
        assert_eq!(signed.get_str("code").as_deref(), Some("foo_code"));
        assert!(signed.has_oauth_data());
    }

    #[test]
    fn test_unauthorized_request_has_no_oauth_data() {
        let signed = SignedRequest::parse(UNAUTHORIZED, SECRET).unwrap();
        assert!(!signed.has_oauth_data());
        assert!(signed.user_id().is_none());
    }

    #[test]
    fn test_wrong_secret_fails() {
        assert_eq!(
            SignedRequest::parse(WITH_TOKEN, "not_the_secret"),
            Err(SignatureError::SignatureMismatch)
        );
    }

    #[test]
    fn test_flipping_any_signature_byte_fails() {
        let raw = SignedRequest::make(Map::new(), SECRET);
        let (sig, payload) = raw.split_once('.').unwrap();
        let mut sig_bytes = BASE64_URL_SAFE_NO_PAD.decode(sig).unwrap();

        for i in 0..sig_bytes.len() {
            sig_bytes[i] ^= 0x01;
            let tampered = format!("{}.{payload}", BASE64_URL_SAFE_NO_PAD.encode(&sig_bytes));
            assert_eq!(
                SignedRequest::parse(&tampered, SECRET),
                Err(SignatureError::SignatureMismatch),
                "flipped byte {i} was accepted"
            );
            sig_bytes[i] ^= 0x01;
        }
    }

    #[test]
    fn test_make_then_parse_exposes_fields() {
        let payload = json!({"user_id": "42", "code": "abc"});
        let raw = SignedRequest::make(payload.as_object().unwrap().clone(), SECRET);
        let signed = SignedRequest::parse(&raw, SECRET).unwrap();

        assert_eq!(signed.user_id().as_deref(), Some("42"));
        assert_eq!(signed.get_str("code").as_deref(), Some("abc"));
        assert_eq!(signed.get_str("algorithm").as_deref(), Some("HMAC-SHA256"));
        assert!(signed.get("issued_at").is_some());
    }

    #[test]
    fn test_signature_bytes_are_kept() {
        let signed = SignedRequest::parse(WITH_TOKEN, SECRET).unwrap();
        let (encoded_sig, encoded_payload) = WITH_TOKEN.split_once('.').unwrap();

        assert_eq!(signed.signature().len(), 32);
        assert_eq!(signed.signature(), base64_url_decode(encoded_sig).unwrap());
        assert_eq!(
            signed.signature(),
            compute_digest(encoded_payload.as_bytes(), SECRET).as_slice()
        );
    }

    #[test]
    fn test_make_keeps_caller_algorithm() {
        let payload = json!({"algorithm": "HMAC-SHA1", "issued_at": 1});
        let raw = SignedRequest::make(payload.as_object().unwrap().clone(), SECRET);
        let (_, encoded_payload) = raw.split_once('.').unwrap();
        let decoded: Value =
            serde_json::from_slice(&base64_url_decode(encoded_payload).unwrap()).unwrap();

        assert_eq!(decoded, payload);
        assert_eq!(
            SignedRequest::parse(&raw, SECRET),
            Err(SignatureError::UnsupportedAlgorithm {
                algorithm: "HMAC-SHA1".to_string()
            })
        );
    }

    #[test]
    fn test_malformed_inputs_fail() {
        for raw in ["", "abc", ".abc", "abc.", "a.b.c"] {
            assert_eq!(
                SignedRequest::parse(raw, SECRET),
                Err(SignatureError::Malformed),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_invalid_payload_encoding_fails() {
        assert_eq!(
            SignedRequest::parse("abc.!!!", SECRET),
            Err(SignatureError::InvalidEncoding { segment: "payload" })
        );
    }

    #[test]
    fn test_non_object_payload_fails() {
        let payload = BASE64_URL_SAFE_NO_PAD.encode("[1,2,3]");
        assert!(matches!(
            SignedRequest::parse(&format!("abc.{payload}"), SECRET),
            Err(SignatureError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_wrong_algorithm_fails_before_signature_check() {
        let payload = BASE64_URL_SAFE_NO_PAD.encode(r#"{"algorithm":"HMAC-MD5"}"#);
        assert_eq!(
            SignedRequest::parse(&format!("!!!.{payload}"), SECRET),
            Err(SignatureError::UnsupportedAlgorithm {
                algorithm: "HMAC-MD5".to_string()
            })
        );
    }
}
