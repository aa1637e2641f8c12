//! Session identity.
//!
//! One process-wide value: the opaque uid of the signed-in user.  The auth
//! flow is the single writer; every screen observes it through a `watch`
//! channel to gate navigation.  The value persists across restarts through
//! an injected key-value interface, under one fixed key.  Concurrent
//! writes are not defended against: last completed write wins.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use directories::ProjectDirs;
use tokio::sync::watch;
use tracing::{info, warn};

use salon_shared::constants::SESSION_STORAGE_KEY;
use salon_shared::Uid;

use crate::error::ClientError;

/// Client-local key-value persistence, injected at startup.
pub trait SessionStorage: Send + Sync {
    fn load(&self, key: &str) -> io::Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// The current session identity.
pub struct Session {
    tx: watch::Sender<Option<Uid>>,
    storage: Arc<dyn SessionStorage>,
}

impl Session {
    /// Restore the persisted session, if any.  A storage read failure is
    /// treated as "no session" rather than an error: the user just signs
    /// in again.
    pub fn restore(storage: Arc<dyn SessionStorage>) -> Self {
        let initial = match storage.load(SESSION_STORAGE_KEY) {
            Ok(value) => value.filter(|v| !v.is_empty()).map(Uid::new),
            Err(e) => {
                warn!(error = %e, "failed to read persisted session");
                None
            }
        };
        let (tx, _) = watch::channel(initial);
        Self { tx, storage }
    }

    /// The signed-in uid, if any.
    pub fn current(&self) -> Option<Uid> {
        self.tx.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Observe session changes (login, logout).
    pub fn subscribe(&self) -> watch::Receiver<Option<Uid>> {
        self.tx.subscribe()
    }

    /// Record a successful sign-in.  Persist failures are logged, not
    /// surfaced: the in-memory session is already valid.
    pub fn set(&self, uid: Uid) {
        if let Err(e) = self.storage.save(SESSION_STORAGE_KEY, uid.as_str()) {
            warn!(error = %e, "failed to persist session");
        }
        info!(uid = %uid.short(), "session opened");
        self.tx.send_replace(Some(uid));
    }

    /// Clear the session on logout.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(SESSION_STORAGE_KEY) {
            warn!(error = %e, "failed to clear persisted session");
        }
        info!("session closed");
        self.tx.send_replace(None);
    }
}

/// File-backed storage: one JSON string per key in the platform data
/// directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open storage in the platform-appropriate data directory.
    pub fn new() -> Result<Self, ClientError> {
        let project_dirs =
            ProjectDirs::from("com", "salon", "salon").ok_or(ClientError::NoDataDir)?;
        Self::open_at(project_dirs.data_dir()).map_err(|e| {
            warn!(error = %e, "failed to create data directory");
            ClientError::NoDataDir
        })
    }

    /// Open storage at an explicit directory.  Useful for tests and custom
    /// layouts.
    pub fn open_at(dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStorage for FileStorage {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(json) => {
                let value: String = serde_json::from_str(&json)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, key: &str, value: &str) -> io::Result<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(self.path_for(key), json)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-memory storage for tests.
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> io::Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_storage_means_no_session() {
        let session = Session::restore(Arc::new(MemoryStorage::new()));
        assert!(!session.is_signed_in());
        assert_eq!(session.current(), None);
    }

    #[test]
    fn set_and_clear_round_trip() {
        let session = Session::restore(Arc::new(MemoryStorage::new()));
        session.set(Uid::new("u1"));
        assert_eq!(session.current(), Some(Uid::new("u1")));

        session.clear();
        assert_eq!(session.current(), None);
    }

    #[test]
    fn observers_see_login_and_logout() {
        let session = Session::restore(Arc::new(MemoryStorage::new()));
        let mut rx = session.subscribe();

        session.set(Uid::new("u1"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().clone(), Some(Uid::new("u1")));

        session.clear();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().clone(), None);
    }

    #[test]
    fn session_survives_restart_via_file_storage() {
        let dir = tempfile::tempdir().unwrap();

        {
            let storage = Arc::new(FileStorage::open_at(dir.path()).unwrap());
            let session = Session::restore(storage);
            session.set(Uid::new("persisted-uid"));
        }

        // Simulated restart: a fresh Session over the same directory.
        let storage = Arc::new(FileStorage::open_at(dir.path()).unwrap());
        let session = Session::restore(storage);
        assert_eq!(session.current(), Some(Uid::new("persisted-uid")));

        session.clear();
        let storage = Arc::new(FileStorage::open_at(dir.path()).unwrap());
        let session = Session::restore(storage);
        assert_eq!(session.current(), None);
    }

    #[test]
    fn last_write_wins() {
        let session = Session::restore(Arc::new(MemoryStorage::new()));
        session.set(Uid::new("first"));
        session.set(Uid::new("second"));
        assert_eq!(session.current(), Some(Uid::new("second")));
    }
}
