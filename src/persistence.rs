//! Persistent data storage for the redirect login flow.
//!
//! The login flow remembers its CSRF `state` between the redirect to the
//! authorization dialog and the redirect back. Where it is kept is chosen
//! with [`PersistentDataBackend`]:
//!
//! - [`PersistentDataBackend::Memory`]: lives as long as the
//!   [`AutozNetwork`](crate::AutozNetwork) instance
//! - [`PersistentDataBackend::Session`]: a session map shared with the host
//!   web framework, keys prefixed with `AZN_`
//! - [`PersistentDataBackend::Custom`]: any [`PersistentDataHandler`]

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ConfigError;

/// A session map shared with the host application.
pub type SessionStore = Arc<Mutex<HashMap<String, String>>>;

/// Prefix added to every key written to a session store.
pub const SESSION_PREFIX: &str = "AZN_";

/// Key/value storage for values that must survive between requests.
pub trait PersistentDataHandler: Send + Sync + fmt::Debug {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`; `None` clears it.
    fn set(&self, key: &str, value: Option<String>);
}

/// Storage held in the handler itself.
#[derive(Debug, Default)]
pub struct MemoryPersistentDataHandler {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryPersistentDataHandler {
    /// Creates an empty handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentDataHandler for MemoryPersistentDataHandler {
    fn get(&self, key: &str) -> Option<String> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Option<String>) {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        match value {
            Some(value) => data.insert(key.to_string(), value),
            None => data.remove(key),
        };
    }
}

/// Storage in a session map owned by the host application.
///
/// Keys are written as `AZN_<key>`, so the SDK can share a session with
/// other data.
///
/// # Example
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use autoznetwork::persistence::{PersistentDataHandler, SessionPersistentDataHandler};
///
/// let session = Arc::new(Mutex::new(Default::default()));
/// let handler = SessionPersistentDataHandler::new(Arc::clone(&session));
/// handler.set("state", Some("abc".to_string()));
///
/// assert_eq!(session.lock().unwrap().get("AZN_state").map(String::as_str), Some("abc"));
/// ```
#[derive(Clone, Debug)]
pub struct SessionPersistentDataHandler {
    session: SessionStore,
}

impl SessionPersistentDataHandler {
    /// Wraps an existing session map.
    #[must_use]
    pub const fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// The underlying session map.
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }
}

impl PersistentDataHandler for SessionPersistentDataHandler {
    fn get(&self, key: &str) -> Option<String> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&format!("{SESSION_PREFIX}{key}"))
            .cloned()
    }

    fn set(&self, key: &str, value: Option<String>) {
        let key = format!("{SESSION_PREFIX}{key}");
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        match value {
            Some(value) => session.insert(key, value),
            None => session.remove(&key),
        };
    }
}

/// Selects where persistent data is kept.
///
/// Parses from `"memory"` or `"session"`; the session variant parsed from a
/// string starts with an empty map.
#[derive(Clone, Debug, Default)]
pub enum PersistentDataBackend {
    /// In-process memory (default).
    #[default]
    Memory,
    /// A shared session map.
    Session(SessionStore),
    /// A caller-supplied handler.
    Custom(Arc<dyn PersistentDataHandler>),
}

impl PersistentDataBackend {
    /// Creates the handler for this backend.
    #[must_use]
    pub fn into_handler(self) -> Arc<dyn PersistentDataHandler> {
        match self {
            Self::Memory => Arc::new(MemoryPersistentDataHandler::new()),
            Self::Session(session) => Arc::new(SessionPersistentDataHandler::new(session)),
            Self::Custom(handler) => handler,
        }
    }
}

impl FromStr for PersistentDataBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Self::Memory),
            "session" => Ok(Self::Session(SessionStore::default())),
            other => Err(ConfigError::InvalidPersistentDataHandler {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_handler_get_set_clear() {
        let handler = MemoryPersistentDataHandler::new();
        assert_eq!(handler.get("foo"), None);

        handler.set("foo", Some("bar".to_string()));
        assert_eq!(handler.get("foo").as_deref(), Some("bar"));

        handler.set("foo", None);
        assert_eq!(handler.get("foo"), None);
    }

    #[test]
    fn test_session_handler_prefixes_keys() {
        let session = SessionStore::default();
        session
            .lock()
            .unwrap()
            .insert("state".to_string(), "unprefixed".to_string());

        let handler = SessionPersistentDataHandler::new(Arc::clone(&session));
        assert_eq!(handler.get("state"), None);

        handler.set("state", Some("abc".to_string()));
        assert_eq!(
            session.lock().unwrap().get("AZN_state").map(String::as_str),
            Some("abc")
        );
        assert_eq!(handler.get("state").as_deref(), Some("abc"));

        handler.set("state", None);
        assert!(!session.lock().unwrap().contains_key("AZN_state"));
    }

    #[test]
    fn test_backend_from_str() {
        assert!(matches!("memory".parse(), Ok(PersistentDataBackend::Memory)));
        assert!(matches!(
            "session".parse(),
            Ok(PersistentDataBackend::Session(_))
        ));

        let result = "redis".parse::<PersistentDataBackend>();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidPersistentDataHandler { ref name }) if name == "redis"
        ));
    }

    #[test]
    fn test_custom_backend_returns_same_handler() {
        let handler: Arc<dyn PersistentDataHandler> = Arc::new(MemoryPersistentDataHandler::new());
        handler.set("foo", Some("bar".to_string()));

        let resolved = PersistentDataBackend::Custom(Arc::clone(&handler)).into_handler();
        assert_eq!(resolved.get("foo").as_deref(), Some("bar"));
    }

    #[test]
    fn test_session_backend_shares_map() {
        let session = SessionStore::default();
        let handler = PersistentDataBackend::Session(Arc::clone(&session)).into_handler();
        handler.set("state", Some("xyz".to_string()));
        assert!(session.lock().unwrap().contains_key("AZN_state"));
    }
}
