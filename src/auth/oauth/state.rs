//! Random state values for OAuth CSRF protection.
//!
//! The redirect login flow binds each login redirect to its return with a
//! one-time random `state` value. Values come from a
//! [`PseudoRandomStringGenerator`]; the default, [`RandomStringGenerator`],
//! draws bytes from the operating system CSPRNG.
//!
//! # Example
//!
//! ```rust
//! use autoznetwork::auth::oauth::{PseudoRandomStringGenerator, RandomStringGenerator};
//!
//! let state = RandomStringGenerator::new().generate(64);
//! assert_eq!(state.len(), 64);
//! assert!(state.chars().all(|c| c.is_ascii_hexdigit()));
//! ```

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

use crate::auth::oauth::hmac::hex_encode;

/// Source of random strings for CSRF state values.
///
/// Implementations must be cryptographically secure; tests may inject a
/// deterministic generator.
pub trait PseudoRandomStringGenerator: Send + Sync + fmt::Debug {
    /// Returns a random string of exactly `length` characters.
    fn generate(&self, length: usize) -> String;
}

/// Hex-encoded random strings backed by the OS random number generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomStringGenerator;

impl RandomStringGenerator {
    /// Creates a new generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PseudoRandomStringGenerator for RandomStringGenerator {
    fn generate(&self, length: usize) -> String {
        let mut bytes = vec![0u8; (length + 1) / 2];
        OsRng.fill_bytes(&mut bytes);
        let mut encoded = hex_encode(bytes);
        encoded.truncate(length);
        encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_requested_length() {
        let generator = RandomStringGenerator::new();
        for length in [0, 1, 15, 32, 64] {
            assert_eq!(generator.generate(length).len(), length);
        }
    }

    #[test]
    fn test_output_is_lowercase_hex() {
        let value = RandomStringGenerator::new().generate(64);
        assert!(value
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_values_are_unique() {
        let generator = RandomStringGenerator::new();
        let values: std::collections::HashSet<_> =
            (0..100).map(|_| generator.generate(64)).collect();
        assert_eq!(values.len(), 100);
    }

    #[test]
    fn test_generator_is_object_safe() {
        let generator: Box<dyn PseudoRandomStringGenerator> = Box::new(RandomStringGenerator);
        assert_eq!(generator.generate(8).len(), 8);
    }
}
