//! HMAC-SHA256 primitives for app secret proofs and signed requests.
//!
//! All signature comparisons use constant-time equality.
//!
//! # Example
//!
//! ```rust
//! use autoznetwork::auth::oauth::hmac::{compute_signature, constant_time_compare};
//!
//! let proof = compute_signature(b"foo_token", "foo_secret");
//! assert_eq!(proof, "df4256903ba4e23636cc142117aa632133d75c642bd2a68955be1443bd14deb9");
//! assert!(constant_time_compare(proof.as_bytes(), proof.as_bytes()));
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes the raw HMAC-SHA256 digest of `message` keyed by `secret`.
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_digest(message: &[u8], secret: &str) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Computes an HMAC-SHA256 signature as a lowercase hex string.
///
/// This is the format of the `appsecret_proof` request parameter.
#[must_use]
pub fn compute_signature(message: &[u8], secret: &str) -> String {
    hex::encode(compute_digest(message, secret))
}

/// Performs constant-time comparison of two byte strings.
///
/// Inputs of different lengths compare unequal.
#[must_use]
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

mod hex {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        let bytes = bytes.as_ref();
        let mut result = String::with_capacity(bytes.len() * 2);
        for &byte in bytes {
            result.push(HEX_CHARS[(byte >> 4) as usize] as char);
            result.push(HEX_CHARS[(byte & 0x0f) as usize] as char);
        }
        result
    }
}

pub(crate) use hex::encode as hex_encode;
