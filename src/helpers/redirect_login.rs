//! Redirect-based login with CSRF protection.

use std::sync::Arc;

use crate::auth::oauth::{
    constant_time_compare, OAuth2Client, PseudoRandomStringGenerator, BASE_AUTHORIZATION_URL,
};
use crate::auth::{AccessToken, AuthError, CsrfError};
use crate::clients::Params;
use crate::error::Error;
use crate::persistence::PersistentDataHandler;
use crate::url::{form_urlencode, remove_params_from_url, RequestContext};

/// Length of generated CSRF `state` values.
pub const CSRF_LENGTH: usize = 64;

const STATE_KEY: &str = "state";

/// Builds login and logout URLs and completes the login on the way back.
///
/// The helper keeps one CSRF `state` value in its
/// [`PersistentDataHandler`]. Every login URL carries it, and
/// [`access_token`](Self::access_token) only exchanges a code when the
/// inbound `state` matches. The persisted value is cleared after a
/// successful match, so a callback URL cannot be replayed.
///
/// # Example
///
/// ```rust,ignore
/// // Request 1: send the user to the dialog.
/// let helper = autoz.redirect_login_helper();
/// let url = helper.login_url("https://myapp.example/callback", &["email"], "&");
///
/// // Request 2: the dialog redirected back with ?code=...&state=...
/// let helper = autoz_for_callback.redirect_login_helper();
/// match helper.access_token(None).await? {
///     Some(token) => println!("logged in"),
///     None => println!("denied: {:?}", helper.error_reason()),
/// }
/// ```
#[derive(Clone, Debug)]
pub struct RedirectLoginHelper {
    oauth2_client: Arc<OAuth2Client>,
    persistent_data_handler: Arc<dyn PersistentDataHandler>,
    random_string_generator: Arc<dyn PseudoRandomStringGenerator>,
    request_context: RequestContext,
}

impl RedirectLoginHelper {
    /// Creates a helper.
    #[must_use]
    pub fn new(
        oauth2_client: Arc<OAuth2Client>,
        persistent_data_handler: Arc<dyn PersistentDataHandler>,
        random_string_generator: Arc<dyn PseudoRandomStringGenerator>,
        request_context: RequestContext,
    ) -> Self {
        Self {
            oauth2_client,
            persistent_data_handler,
            random_string_generator,
            request_context,
        }
    }

    /// The store holding the CSRF state.
    #[must_use]
    pub fn persistent_data_handler(&self) -> &Arc<dyn PersistentDataHandler> {
        &self.persistent_data_handler
    }

    /// The generator for new CSRF states.
    #[must_use]
    pub fn random_string_generator(&self) -> &Arc<dyn PseudoRandomStringGenerator> {
        &self.random_string_generator
    }

    /// The inbound request this helper reads.
    #[must_use]
    pub const fn request_context(&self) -> &RequestContext {
        &self.request_context
    }

    /// Returns the URL of the login dialog.
    #[must_use]
    pub fn login_url(&self, redirect_url: &str, scopes: &[&str], separator: &str) -> String {
        self.make_url(redirect_url, scopes, Params::new(), separator)
    }

    /// Returns a login URL asking again for declined permissions.
    #[must_use]
    pub fn rerequest_url(&self, redirect_url: &str, scopes: &[&str], separator: &str) -> String {
        let params = Params::new().with("auth_type", "rerequest");
        self.make_url(redirect_url, scopes, params, separator)
    }

    /// Returns a login URL that makes the user enter their password again.
    #[must_use]
    pub fn reauthentication_url(
        &self,
        redirect_url: &str,
        scopes: &[&str],
        separator: &str,
    ) -> String {
        let params = Params::new().with("auth_type", "reauthenticate");
        self.make_url(redirect_url, scopes, params, separator)
    }

    /// Returns the URL that logs the user out and then goes to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::LogoutWithAppToken`] for an app access token.
    pub fn logout_url(
        &self,
        access_token: impl Into<AccessToken>,
        next: &str,
        separator: &str,
    ) -> Result<String, AuthError> {
        let access_token = access_token.into();
        if access_token.is_app_access_token() {
            return Err(AuthError::LogoutWithAppToken);
        }

        Ok(format!(
            "{BASE_AUTHORIZATION_URL}/logout.php?next={}{separator}access_token={}",
            form_urlencode(next),
            form_urlencode(access_token.value())
        ))
    }

    /// Completes the login on the redirect back from the dialog.
    ///
    /// Returns `Ok(None)` when the inbound request carries no `code` (the
    /// user denied access, or this is not a callback). The code is exchanged
    /// with a redirect URI of `redirect_url`, or the current URL, minus its
    /// `code`, `state` and `enforce_https` parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Csrf`] if `state` is missing on either side or the
    /// values differ, and any error from the code exchange.
    pub async fn access_token(&self, redirect_url: Option<&str>) -> Result<Option<AccessToken>, Error> {
        let Some(code) = self.input("code") else {
            return Ok(None);
        };

        if let Err(error) = self.validate_csrf() {
            tracing::warn!("Rejected login callback: {}", error);
            return Err(error.into());
        }
        self.persistent_data_handler.set(STATE_KEY, None);

        let redirect_url = redirect_url
            .or_else(|| self.request_context.current_url())
            .unwrap_or_default();
        let redirect_url = remove_params_from_url(redirect_url, &["code", "enforce_https", "state"]);

        let token = self
            .oauth2_client
            .access_token_from_code(code, &redirect_url)
            .await?;
        Ok(Some(token))
    }

    /// The `error` query parameter of a denied login.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.input("error")
    }

    /// The `error_code` query parameter of a denied login.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.input("error_code")
    }

    /// The `error_reason` query parameter of a denied login.
    #[must_use]
    pub fn error_reason(&self) -> Option<&str> {
        self.input("error_reason")
    }

    /// The `error_description` query parameter of a denied login.
    #[must_use]
    pub fn error_description(&self) -> Option<&str> {
        self.input("error_description")
    }

    fn make_url(&self, redirect_url: &str, scopes: &[&str], params: Params, separator: &str) -> String {
        let state = self
            .persistent_data_handler
            .get(STATE_KEY)
            .filter(|state| !state.is_empty())
            .unwrap_or_else(|| self.random_string_generator.generate(CSRF_LENGTH));
        self.persistent_data_handler
            .set(STATE_KEY, Some(state.clone()));

        self.oauth2_client
            .authorization_url(redirect_url, &state, scopes, params, separator)
    }

    fn validate_csrf(&self) -> Result<(), CsrfError> {
        let state = self
            .input("state")
            .filter(|state| !state.is_empty())
            .ok_or(CsrfError::MissingQueryState)?;
        let saved_state = self
            .persistent_data_handler
            .get(STATE_KEY)
            .filter(|state| !state.is_empty())
            .ok_or(CsrfError::MissingPersistedState)?;

        if constant_time_compare(saved_state.as_bytes(), state.as_bytes()) {
            Ok(())
        } else {
            Err(CsrfError::Mismatch)
        }
    }

    fn input(&self, key: &str) -> Option<&str> {
        self.request_context
            .query_param(key)
            .filter(|value| !value.is_empty())
    }
}
