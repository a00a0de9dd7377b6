//! API version handling.
//!
//! This module provides the [`ApiVersion`] type for selecting which version
//! of the AutozNetwork REST API a request targets.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// AutozNetwork REST API version, such as `v1.0`.
///
/// # Example
///
/// ```rust
/// use autoznetwork::ApiVersion;
///
/// let version = ApiVersion::default();
/// assert_eq!(version.as_ref(), "v1.0");
///
/// let version: ApiVersion = "v2.3".parse().unwrap();
/// assert_eq!(version.to_string(), "v2.3");
///
/// assert!("2.3".parse::<ApiVersion>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiVersion(String);

impl ApiVersion {
    /// The default REST API version.
    pub const DEFAULT: &'static str = "v1.0";

    /// Creates a validated API version.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiVersion`] unless the value looks like
    /// `v<major>` or `v<major>.<minor>`.
    pub fn new(version: impl Into<String>) -> Result<Self, ConfigError> {
        let version = version.into();
        if Self::is_valid(&version) {
            Ok(Self(version))
        } else {
            Err(ConfigError::InvalidApiVersion { version })
        }
    }

    fn is_valid(version: &str) -> bool {
        let Some(rest) = version.strip_prefix('v') else {
            return false;
        };
        let parts: Vec<&str> = rest.split('.').collect();
        parts.len() <= 2
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl AsRef<str> for ApiVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_version_is_v1_0() {
        assert_eq!(ApiVersion::default().as_ref(), "v1.0");
    }

    #[test]
    fn test_parses_valid_versions() {
        for v in ["v1.0", "v2.12", "v1337"] {
            assert_eq!(v.parse::<ApiVersion>().unwrap().as_ref(), v);
        }
    }

    #[test]
    fn test_rejects_invalid_versions() {
        for v in ["", "v", "1.0", "v1.", "v.1", "v1.0.0", "vX.Y", "v1.0-beta"] {
            assert!(
                matches!(v.parse::<ApiVersion>(), Err(ConfigError::InvalidApiVersion { .. })),
                "expected {v:?} to be rejected"
            );
        }
    }
}
