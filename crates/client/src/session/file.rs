//! JSON file session store.

use std::fs;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use super::{Session, SessionError, SessionStore};

/// Stores a session as `<dir>/<namespace>.json`.
///
/// Writes go to a uniquely named sibling temp file first and are renamed into
/// place, so an interrupted save never leaves a half-written session behind
/// and concurrent saves never share a temp file. On Unix the file is created
/// owner-only (`0600`) since it holds the bearer token.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    namespace: String,
    path: PathBuf,
}

impl FileSessionStore {
    /// Store for `namespace` inside `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let path = dir.as_ref().join(format!("{namespace}.json"));
        Self { namespace, path }
    }

    /// Location of the session document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Session, SessionError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored session");
                Ok(Session::default())
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    #[instrument(skip(self, session), fields(path = %self.path.display()))]
    fn save(&self, session: &Session) -> Result<(), SessionError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let json = serde_json::to_vec_pretty(session)?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(&json).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        debug!("Session saved");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn full_session() -> Session {
        Session {
            token: Some("jwt-token".to_string()),
            user_name: Some("Meena".to_string()),
            email: Some("meena@shg.org".to_string()),
            role: Some("shg_fpo".to_string()),
            city: Some("Anantapur".to_string()),
            street: Some("Ward 4".to_string()),
            mobile: Some("9800000000".to_string()),
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), "millet_session");

        assert_eq!(store.load().unwrap(), Session::default());
    }

    #[test]
    fn test_save_then_load_keeps_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested"), "millet_session");

        store.save(&full_session()).unwrap();

        assert!(store.path().ends_with("nested/millet_session.json"));
        assert_eq!(store.load().unwrap(), full_session());
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let a = FileSessionStore::new(dir.path(), "a");
        let b = FileSessionStore::new(dir.path(), "b");

        a.save(&full_session()).unwrap();

        assert_eq!(b.load().unwrap(), Session::default());
        assert_eq!(a.namespace(), "a");
    }

    #[test]
    fn test_clear_removes_session_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), "millet_session");
        store.save(&full_session()).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();

        assert_eq!(store.load().unwrap(), Session::default());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_session_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), "millet_session");

        store.save(&full_session()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0, "session file mode is {mode:o}");
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), "millet_session");

        store.save(&full_session()).unwrap();
        store.save(&Session::default()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.load().unwrap(), Session::default());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), "millet_session");
        fs::write(store.path(), b"{not json").unwrap();

        assert!(matches!(store.load(), Err(SessionError::Serde(_))));
    }
}
