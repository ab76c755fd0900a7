//! Identity persistence.
//!
//! A single serialized [`Identity`] record in one known slot, restored at
//! startup without backend revalidation. Anything unreadable - missing
//! file, IO failure, malformed JSON - means "no identity": the session
//! falls back to guest mode rather than surfacing an error.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::api::types::Identity;

/// Persistence slot for the identity record.
///
/// Object-safe so the session store can take any backing implementation.
pub trait IdentityStorage: Send + Sync {
    /// Load the persisted identity, if any. Malformed or unreadable data is
    /// treated as absent.
    fn load(&self) -> Option<Identity>;

    /// Persist the identity.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the record could not be written.
    fn save(&self, identity: &Identity) -> io::Result<()>;

    /// Remove the persisted identity.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the record exists but could not be removed.
    fn clear(&self) -> io::Result<()>;
}

/// File-backed identity storage: one JSON file at a configured path.
#[derive(Debug, Clone)]
pub struct FileIdentityStorage {
    path: PathBuf,
}

impl FileIdentityStorage {
    /// Create storage backed by the given file path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl IdentityStorage for FileIdentityStorage {
    fn load(&self) -> Option<Identity> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read identity file");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                // Fail safe to guest mode; the next login rewrites the file
                tracing::warn!(path = %self.path.display(), error = %e, "malformed identity file, starting as guest");
                None
            }
        }
    }

    fn save(&self, identity: &Identity) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(identity)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-memory identity storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryIdentityStorage {
    slot: Mutex<Option<Identity>>,
}

impl MemoryIdentityStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with an identity, as if a previous
    /// session had logged in.
    #[must_use]
    pub fn with_identity(identity: Identity) -> Self {
        Self {
            slot: Mutex::new(Some(identity)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Identity>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityStorage for MemoryIdentityStorage {
    fn load(&self) -> Option<Identity> {
        self.lock().clone()
    }

    fn save(&self, identity: &Identity) -> io::Result<()> {
        *self.lock() = Some(identity.clone());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tangelo_core::UserId;

    fn identity() -> Identity {
        Identity {
            id: UserId::new(7),
            name: "Ada".to_string(),
            email: tangelo_core::Email::parse("ada@example.com").expect("valid email"),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tangelo-storage-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let path = temp_path("roundtrip.json");
        let storage = FileIdentityStorage::new(path.clone());

        assert!(storage.load().is_none());
        storage.save(&identity()).expect("save");
        assert_eq!(storage.load(), Some(identity()));

        storage.clear().expect("clear");
        assert!(storage.load().is_none());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_file_storage_malformed_json_is_guest() {
        let path = temp_path("malformed.json");
        fs::write(&path, "{not json").expect("write garbage");

        let storage = FileIdentityStorage::new(path.clone());
        assert!(storage.load().is_none());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_file_storage_clear_missing_file_is_ok() {
        let storage = FileIdentityStorage::new(temp_path("never-created.json"));
        assert!(storage.clear().is_ok());
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryIdentityStorage::new();
        assert!(storage.load().is_none());
        storage.save(&identity()).expect("save");
        assert_eq!(storage.load(), Some(identity()));
        storage.clear().expect("clear");
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_memory_storage_with_identity() {
        let storage = MemoryIdentityStorage::with_identity(identity());
        assert_eq!(storage.load(), Some(identity()));
    }
}
