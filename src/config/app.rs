//! The application credentials pair.

use crate::auth::AccessToken;
use crate::config::{AppId, AppSecret};

/// An AutozNetwork application: its ID and secret.
///
/// The app is shared by value with the OAuth2 client and every request
/// entity, which use the secret to derive app secret proofs.
///
/// # Example
///
/// ```rust
/// use autoznetwork::{App, AppId, AppSecret};
///
/// let app = App::new(AppId::new("123").unwrap(), AppSecret::new("foo_secret").unwrap());
/// let token = app.access_token();
/// assert_eq!(token.value(), "123|foo_secret");
/// assert!(token.is_app_access_token());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct App {
    id: AppId,
    secret: AppSecret,
}

impl App {
    /// Creates a new app from validated credentials.
    #[must_use]
    pub const fn new(id: AppId, secret: AppSecret) -> Self {
        Self { id, secret }
    }

    /// Returns the app ID.
    #[must_use]
    pub const fn id(&self) -> &AppId {
        &self.id
    }

    /// Returns the app secret.
    #[must_use]
    pub const fn secret(&self) -> &AppSecret {
        &self.secret
    }

    /// Returns the app access token, `"{id}|{secret}"`.
    ///
    /// App access tokens never expire.
    #[must_use]
    pub fn access_token(&self) -> AccessToken {
        AccessToken::new(format!("{}|{}", self.id, self.secret.as_ref()), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(AppId::new("1337").unwrap(), AppSecret::new("foo_secret").unwrap())
    }

    #[test]
    fn test_getters() {
        let app = app();
        assert_eq!(app.id().as_ref(), "1337");
        assert_eq!(app.secret().as_ref(), "foo_secret");
    }

    #[test]
    fn test_app_access_token_does_not_expire() {
        let token = app().access_token();
        assert_eq!(token.value(), "1337|foo_secret");
        assert!(token.is_app_access_token());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_debug_masks_secret() {
        let debug = format!("{:?}", app());
        assert!(debug.contains("1337"));
        assert!(!debug.contains("foo_secret"));
    }
}
