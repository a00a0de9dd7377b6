//! Validated newtype wrappers for app credentials.
//!
//! Invalid values are rejected on construction with a [`ConfigError`].

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated AutozNetwork app ID.
///
/// App IDs are numeric strings. The value must fit in an unsigned 64-bit
/// integer; anything larger is rejected rather than silently truncated.
///
/// # Example
///
/// ```rust
/// use autoznetwork::AppId;
///
/// let id = AppId::new("123").unwrap();
/// assert_eq!(id.as_ref(), "123");
///
/// assert!(AppId::new("18446744073709551616").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AppId(String);

impl AppId {
    /// Creates a new validated app ID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAppId`] if the ID is empty, or
    /// [`ConfigError::InvalidAppId`] if it is not a `u64` in decimal form.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into();
        let id = id.trim();
        if id.is_empty() {
            return Err(ConfigError::EmptyAppId);
        }
        if !id.bytes().all(|b| b.is_ascii_digit()) || id.parse::<u64>().is_err() {
            return Err(ConfigError::InvalidAppId {
                app_id: id.to_string(),
            });
        }
        Ok(Self(id.to_string()))
    }
}

impl From<u64> for AppId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for AppId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for AppId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AppId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated AutozNetwork app secret.
///
/// The `Debug` implementation masks the value, displaying only
/// `AppSecret(*****)`, so secrets never end up in logs.
///
/// # Example
///
/// ```rust
/// use autoznetwork::AppSecret;
///
/// let secret = AppSecret::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "AppSecret(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AppSecret(String);

impl AppSecret {
    /// Creates a new validated app secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAppSecret`] if the secret is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptyAppSecret);
        }
        Ok(Self(secret))
    }
}

impl AsRef<str> for AppSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AppSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AppSecret(*****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_id_accepts_numeric_string() {
        let id = AppId::new("123").unwrap();
        assert_eq!(id.as_ref(), "123");
        assert_eq!(id.to_string(), "123");
    }

    #[test]
    fn test_app_id_rejects_empty() {
        assert!(matches!(AppId::new(""), Err(ConfigError::EmptyAppId)));
        assert!(matches!(AppId::new("   "), Err(ConfigError::EmptyAppId)));
    }

    #[test]
    fn test_app_id_rejects_non_numeric() {
        assert!(matches!(
            AppId::new("abc"),
            Err(ConfigError::InvalidAppId { app_id }) if app_id == "abc"
        ));
        assert!(AppId::new("-1").is_err());
        assert!(AppId::new("12.5").is_err());
    }

    #[test]
    fn test_app_id_overflow_is_rejected() {
        assert!(AppId::new(u64::MAX.to_string()).is_ok());
        assert!(matches!(
            AppId::new("18446744073709551616"),
            Err(ConfigError::InvalidAppId { .. })
        ));
    }

    #[test]
    fn test_app_id_from_u64() {
        assert_eq!(AppId::from(1337).as_ref(), "1337");
    }

    #[test]
    fn test_app_id_serde_is_a_plain_string() {
        let id = AppId::new("123").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""123""#);

        let back: AppId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<AppId>(r#""nope""#).is_err());
    }

    #[test]
    fn test_app_secret_rejects_empty() {
        assert!(matches!(AppSecret::new(""), Err(ConfigError::EmptyAppSecret)));
    }

    #[test]
    fn test_app_secret_debug_is_masked() {
        let secret = AppSecret::new("super-secret").unwrap();
        let debug = format!("{secret:?}");
        assert_eq!(debug, "AppSecret(*****)");
        assert!(!debug.contains("super-secret"));
    }
}
