//! In-memory session store.

use std::sync::{Mutex, PoisonError};

use super::{Session, SessionError, SessionStore};

/// Keeps the session in process memory; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    namespace: String,
    session: Mutex<Session>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            session: Mutex::new(Session::default()),
        }
    }

    /// Start from an existing session.
    #[must_use]
    pub fn with_session(namespace: impl Into<String>, session: Session) -> Self {
        Self {
            namespace: namespace.into(),
            session: Mutex::new(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn load(&self) -> Result<Session, SessionError> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Session::default();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_clear() {
        let store = MemorySessionStore::new("test");
        assert_eq!(store.load().unwrap(), Session::default());

        let session = Session {
            mobile: Some("9000000001".to_string()),
            ..Session::default()
        };
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), session);

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), Session::default());
    }
}
