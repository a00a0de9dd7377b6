//! Access tokens from signed requests delivered by the client side.

use std::sync::Arc;

use serde_json::Value;

use crate::auth::oauth::OAuth2Client;
use crate::auth::{AccessToken, SignedRequest, SignatureError};
use crate::config::App;
use crate::error::Error;
use crate::url::RequestContext;

/// POST field carrying a signed request.
pub const SIGNED_REQUEST_POST_FIELD: &str = "signed_request";

/// Prefix of the cookie carrying a signed request; the app ID follows it.
pub const SIGNED_REQUEST_COOKIE_PREFIX: &str = "fbsr_";

/// Where a [`SignedRequestHelper`] finds its raw signed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignedRequestSource {
    /// The `fbsr_<app_id>` cookie set by the JavaScript SDK.
    Cookie,
    /// The `signed_request` POST field.
    Post,
    /// A value supplied by the caller.
    Raw(String),
}

impl SignedRequestSource {
    /// Reads the raw signed request from `context`.
    #[must_use]
    pub fn raw_signed_request(&self, app: &App, context: &RequestContext) -> Option<String> {
        let raw = match self {
            Self::Cookie => context
                .cookie(&format!("{SIGNED_REQUEST_COOKIE_PREFIX}{}", app.id()))
                .map(str::to_string),
            Self::Post => context.post_param(SIGNED_REQUEST_POST_FIELD).map(str::to_string),
            Self::Raw(raw) => Some(raw.clone()),
        };
        raw.filter(|raw| !raw.is_empty())
    }
}

/// Verifies a signed request from the inbound request and derives an access
/// token from it.
///
/// The request is verified once, at construction; an absent signed request
/// is not an error and leaves the helper empty.
///
/// # Example
///
/// ```rust,ignore
/// let helper = autoz.javascript_helper()?;
/// if let Some(token) = helper.access_token().await? {
///     println!("user {:?} is logged in", helper.user_id());
/// }
/// ```
#[derive(Clone, Debug)]
pub struct SignedRequestHelper {
    oauth2_client: Arc<OAuth2Client>,
    signed_request: Option<SignedRequest>,
}

impl SignedRequestHelper {
    /// Reads and verifies the signed request from `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`SignatureError`] if a signed request is present but fails
    /// verification.
    pub fn new(
        oauth2_client: Arc<OAuth2Client>,
        source: &SignedRequestSource,
        context: &RequestContext,
    ) -> Result<Self, SignatureError> {
        let app = oauth2_client.app();
        let signed_request = source
            .raw_signed_request(app, context)
            .map(|raw| SignedRequest::parse(&raw, app.secret().as_ref()))
            .transpose()?;

        Ok(Self {
            oauth2_client,
            signed_request,
        })
    }

    /// The verified signed request, if one was present.
    #[must_use]
    pub const fn signed_request(&self) -> Option<&SignedRequest> {
        self.signed_request.as_ref()
    }

    /// The `user_id` of the signed request.
    #[must_use]
    pub fn user_id(&self) -> Option<String> {
        self.signed_request.as_ref().and_then(SignedRequest::user_id)
    }

    /// Returns the access token the signed request grants.
    ///
    /// An `oauth_token` is used as-is with its `expires` timestamp; a bare
    /// `code` is exchanged for a token. Returns `Ok(None)` when there is no
    /// signed request or it carries neither.
    ///
    /// # Errors
    ///
    /// Returns any error from the code exchange.
    pub async fn access_token(&self) -> Result<Option<AccessToken>, Error> {
        let Some(signed_request) = self.signed_request.as_ref().filter(|sr| sr.has_oauth_data()) else {
            return Ok(None);
        };

        if let Some(token) = signed_request.get_str("oauth_token") {
            let expires_at = match signed_request.get("expires") {
                Some(Value::Number(n)) => n.as_i64().unwrap_or_default(),
                Some(Value::String(s)) => s.parse().unwrap_or_default(),
                _ => 0,
            };
            return Ok(Some(AccessToken::from_timestamp(token, expires_at)));
        }

        match signed_request.get_str("code") {
            Some(code) => {
                let token = self.oauth2_client.access_token_from_code(&code, "").await?;
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }
}
