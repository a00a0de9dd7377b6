//! Login helpers built on the OAuth client.
//!
//! - [`RedirectLoginHelper`]: the server-side redirect flow with CSRF state
//! - [`SignedRequestHelper`]: tokens from a signed request in a cookie, a
//!   POST field or a raw value ([`SignedRequestSource`])
//!
//! The JavaScript SDK stores its signed request in the `fbsr_<app_id>`
//! cookie; [`AutozNetwork::javascript_helper`](crate::AutozNetwork::javascript_helper)
//! is a [`SignedRequestHelper`] reading that cookie.

mod redirect_login;
mod signed_request_helper;

pub use redirect_login::{RedirectLoginHelper, CSRF_LENGTH};
pub use signed_request_helper::{
    SignedRequestHelper, SignedRequestSource, SIGNED_REQUEST_COOKIE_PREFIX,
    SIGNED_REQUEST_POST_FIELD,
};
