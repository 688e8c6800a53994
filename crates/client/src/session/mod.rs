//! Persisted session fields.
//!
//! A session is a small fixed set of optional strings (auth token and the
//! profile fields shown across the app) stored under a single namespace.
//! Storage sits behind the [`SessionStore`] trait:
//!
//! - [`FileSessionStore`] - one JSON document per namespace on disk
//! - [`MemorySessionStore`] - process-local, for tests and throwaway runs

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use std::path::PathBuf;

use millet_market_core::UserRole;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading or writing the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Filesystem access failed.
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored document is not valid session JSON.
    #[error("session data is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Session fields kept between runs.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub token: Option<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub mobile: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("city", &self.city)
            .field("street", &self.street)
            .field("mobile", &self.mobile)
            .finish()
    }
}

impl Session {
    /// A non-empty token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Token wrapped for handing to the API client.
    #[must_use]
    pub fn bearer_token(&self) -> Option<SecretString> {
        self.token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from)
    }

    /// Role parsed from its stored string; unknown values read as `None`.
    #[must_use]
    pub fn role(&self) -> Option<UserRole> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }

    /// `"street, city"` from whichever parts are set.
    #[must_use]
    pub fn shipping_address(&self) -> Option<String> {
        let parts: Vec<&str> = [self.street.as_deref(), self.city.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Storage backend for a namespaced [`Session`].
pub trait SessionStore: Send + Sync {
    /// Namespace the session is stored under.
    fn namespace(&self) -> &str;

    /// Load the stored session; an empty session if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the backing storage cannot be read or holds
    /// invalid data.
    fn load(&self) -> Result<Session, SessionError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session cannot be written.
    fn save(&self, session: &Session) -> Result<(), SessionError>;

    /// Remove every stored field.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the backing storage cannot be cleared.
    fn clear(&self) -> Result<(), SessionError>;
}
