//! Authentication types for the AutozNetwork SDK.
//!
//! # Overview
//!
//! - [`AccessToken`]: a user or app access token with optional expiry
//! - [`AccessTokenMetadata`]: the result of inspecting a token
//! - [`SignedRequest`]: a verified `signature.payload` value
//! - [`oauth`]: the OAuth 2.0 client and its primitives
//! - [`AuthError`], [`CsrfError`], [`SignatureError`]: failures of this module
//!
//! # App access tokens
//!
//! An app can act as itself with the token `"{app_id}|{app_secret}"`.
//! Such tokens never expire:
//!
//! ```rust
//! use autoznetwork::AccessToken;
//!
//! let token = AccessToken::from_timestamp("123|foo_secret", 1);
//! assert!(token.is_app_access_token());
//! assert!(!token.is_expired());
//! ```

mod access_token;
mod access_token_metadata;
mod error;
pub mod oauth;
mod signed_request;

pub use access_token::AccessToken;
pub use access_token_metadata::AccessTokenMetadata;
pub use error::{AuthError, CsrfError, SignatureError};
pub use signed_request::{SignedRequest, SIGNED_REQUEST_ALGORITHM};
