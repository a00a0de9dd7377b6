//! OAuth 2.0 support for AutozNetwork apps.
//!
//! - [`OAuth2Client`]: authorization URLs and token exchanges
//! - [`hmac`]: HMAC-SHA256 signatures and constant-time comparison
//! - [`PseudoRandomStringGenerator`]: CSRF state values
//!
//! # Authorization Code Flow
//!
//! 1. Send the user to [`OAuth2Client::authorization_url`] with a random
//!    `state` (the [`RedirectLoginHelper`](crate::helpers::RedirectLoginHelper)
//!    does this and remembers the state).
//! 2. On the redirect back, check `state` and call
//!    [`OAuth2Client::access_token_from_code`].
//! 3. Optionally upgrade the token with
//!    [`OAuth2Client::long_lived_access_token`].
//!
//! # Example
//!
//! ```rust,ignore
//! use autoznetwork::auth::oauth::OAuth2Client;
//!
//! let oauth = autoz.oauth2_client();
//! let token = oauth.access_token_from_code(&code, "https://myapp.example/callback").await?;
//! let token = oauth.long_lived_access_token(&token).await?;
//!
//! let metadata = oauth.debug_token(&token).await?;
//! metadata.validate_app_id("123")?;
//! ```

mod client;
pub mod hmac;
mod state;

pub use client::{OAuth2Client, BASE_AUTHORIZATION_URL};
pub use hmac::{compute_signature, constant_time_compare};
pub use state::{PseudoRandomStringGenerator, RandomStringGenerator};
