//! API key handling with secure memory.
//!
//! Uses the `secrecy` crate so search and provider credentials never leak
//! into logs, `Debug` output, or error messages.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A credential that renders as `[REDACTED]` everywhere except
/// [`SecretString::expose`].
pub struct SecretString(SecretBox<str>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Read a credential from the environment.
    ///
    /// Empty values count as unset; credential presence is checked once at
    /// startup, not per call.
    pub fn from_env(variable: &str) -> Option<Self> {
        match std::env::var(variable) {
            Ok(v) if !v.trim().is_empty() => Some(Self::new(v)),
            _ => None,
        }
    }

    /// Expose the raw value. Only call at the point of use, e.g. when
    /// building an Authorization header.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
