//! Request body encoders.
//!
//! Requests without file uploads are sent as
//! `application/x-www-form-urlencoded`; requests with uploads are sent as
//! `multipart/form-data`.

use std::collections::BTreeMap;

use crate::auth::oauth::{PseudoRandomStringGenerator, RandomStringGenerator};
use crate::clients::{Params, UploadFile, ValidationError};
use crate::url::form_urlencode;

const BOUNDARY_LENGTH: usize = 32;

/// Encodes params the way HTML forms do: `a=1&b%5Bc%5D=2`.
///
/// Nested values use bracket names, booleans become `1`/`0` and nulls are
/// left out.
///
/// ```rust
/// use autoznetwork::clients::url_encode_params;
/// use autoznetwork::Params;
///
/// let params = Params::new().with("q", "a b").with("ids", vec![1, 2]);
/// assert_eq!(url_encode_params(&params), "q=a+b&ids%5B0%5D=1&ids%5B1%5D=2");
/// ```
#[must_use]
pub fn url_encode_params(params: &Params) -> String {
    params
        .flatten()
        .iter()
        .map(|(key, value)| format!("{}={}", form_urlencode(key), form_urlencode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// An `application/x-www-form-urlencoded` request body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlEncodedBody {
    encoded: String,
}

impl UrlEncodedBody {
    /// Encodes `params`.
    #[must_use]
    pub fn new(params: &Params) -> Self {
        Self {
            encoded: url_encode_params(params),
        }
    }

    /// The encoded body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.encoded
    }

    /// Consumes the body, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.encoded.into_bytes()
    }
}

/// A `multipart/form-data` request body.
///
/// Params are written first, in insertion order, followed by files in name
/// order.
#[derive(Clone, Debug)]
pub struct MultipartBody {
    boundary: String,
    params: Params,
    files: BTreeMap<String, UploadFile>,
}

impl MultipartBody {
    /// Creates a body with a random boundary.
    #[must_use]
    pub fn new(params: Params, files: BTreeMap<String, UploadFile>) -> Self {
        let boundary = RandomStringGenerator::new().generate(BOUNDARY_LENGTH);
        Self::with_boundary(params, files, boundary)
    }

    /// Creates a body with a fixed boundary.
    #[must_use]
    pub fn with_boundary(
        params: Params,
        files: BTreeMap<String, UploadFile>,
        boundary: impl Into<String>,
    ) -> Self {
        Self {
            boundary: boundary.into(),
            params,
            files,
        }
    }

    /// The part boundary.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The `Content-Type` header value for this body.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Builds the body, reading every file.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FileRead`] if a file cannot be read.
    pub fn body(&self) -> Result<Vec<u8>, ValidationError> {
        let mut body = Vec::new();

        for (name, value) in self.params.flatten() {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                    self.boundary
                )
                .as_bytes(),
            );
        }

        for (name, file) in &self.files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    self.boundary,
                    file.file_name(),
                    file.mime_type()
                )
                .as_bytes(),
            );
            body.extend_from_slice(&file.contents()?);
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Ok(body)
    }
}
