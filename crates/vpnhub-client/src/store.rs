use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::error::StoreError;

/// The two durable credential slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Slot {
    AccessToken,
    RefreshToken,
}

impl Slot {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
        }
    }
}

/// Durable client-local key/value storage for credentials.
///
/// `remove` must succeed when the slot is already empty.
pub trait CredentialStore: Send + Sync {
    fn load(&self, slot: Slot) -> Result<Option<String>, StoreError>;
    fn save(&self, slot: Slot, value: &str) -> Result<(), StoreError>;
    fn remove(&self, slot: Slot) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<BTreeMap<Slot, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out holding `access` and, optionally, `refresh`.
    #[must_use]
    pub fn seeded(access: &str, refresh: Option<&str>) -> Self {
        let mut slots = BTreeMap::new();
        slots.insert(Slot::AccessToken, access.to_string());
        if let Some(refresh) = refresh {
            slots.insert(Slot::RefreshToken, refresh.to_string());
        }
        Self {
            slots: Mutex::new(slots),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self, slot: Slot) -> Result<Option<String>, StoreError> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(&slot).cloned())
    }

    fn save(&self, slot: Slot, value: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(&slot);
        Ok(())
    }
}

/// Credentials kept in a small JSON file, readable only by the owner.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|err| StoreError::Format(err.to_string()))
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if entries.is_empty() {
            match fs::remove_file(&self.path) {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
                Err(err) => return Err(err.into()),
            }
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|err| StoreError::Format(err.to_string()))?;
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn load(&self, slot: Slot) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read()?.remove(slot.as_str()))
    }

    fn save(&self, slot: Slot, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read()?;
        entries.insert(slot.as_str().to_string(), value.to_string());
        self.write(&entries)
    }

    fn remove(&self, slot: Slot) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read()?;
        if entries.remove(slot.as_str()).is_none() {
            return Ok(());
        }
        self.write(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() -> Result<(), StoreError> {
        let store = MemoryStore::new();
        store.save(Slot::AccessToken, "access")?;
        assert_eq!(store.load(Slot::AccessToken)?, Some("access".to_string()));
        assert_eq!(store.load(Slot::RefreshToken)?, None);
        store.remove(Slot::AccessToken)?;
        store.remove(Slot::AccessToken)?;
        assert_eq!(store.load(Slot::AccessToken)?, None);
        Ok(())
    }

    #[test]
    fn file_store_persists_across_instances() -> Result<(), StoreError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileStore::new(&path);
        store.save(Slot::AccessToken, "T1")?;
        store.save(Slot::RefreshToken, "R1")?;

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.load(Slot::AccessToken)?, Some("T1".to_string()));
        assert_eq!(reopened.load(Slot::RefreshToken)?, Some("R1".to_string()));

        reopened.remove(Slot::AccessToken)?;
        reopened.remove(Slot::RefreshToken)?;
        assert!(!path.exists());
        reopened.remove(Slot::RefreshToken)?;
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() -> Result<(), StoreError> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("credentials.json");
        FileStore::new(&path).save(Slot::AccessToken, "T1")?;
        let mode = fs::metadata(&path)?.permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        Ok(())
    }

    #[test]
    fn file_store_reports_malformed_files() -> Result<(), StoreError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("credentials.json");
        fs::write(&path, "not json")?;
        let result = FileStore::new(&path).load(Slot::AccessToken);
        assert!(matches!(result, Err(StoreError::Format(_))));
        Ok(())
    }
}
