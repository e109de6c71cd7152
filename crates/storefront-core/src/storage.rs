//! # Durable Cart Storage
//!
//! A small key/value seam standing in for browser local storage.
//! `CartStore` holds one of these for its whole lifetime and writes through
//! it after every mutation.

use crate::error::{ShopError, ShopResult};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key/value storage for serialized client state.
pub trait CartStorage: Send {
    /// Read a value. Missing keys and unreadable data both yield `None`.
    fn load(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn save(&mut self, key: &str, value: &str) -> ShopResult<()>;

    /// Remove a value; missing keys are fine.
    fn remove(&mut self, key: &str) -> ShopResult<()>;
}

/// In-process storage, lost when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: pre-populate a key (used to simulate previous sessions)
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> ShopResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ShopResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One file per key inside a data directory.
///
/// Writes go to `<key>.json.tmp` first and are renamed over the target, so a
/// crash mid-write leaves either the old or the new cart on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the data directory
    pub fn open(dir: impl Into<PathBuf>) -> ShopResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            ShopError::Storage(format!("cannot create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl CartStorage for FileStorage {
    fn load(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                debug!("Unreadable storage file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn save(&mut self, key: &str, value: &str) -> ShopResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, value)
            .map_err(|e| ShopError::Storage(format!("write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .map_err(|e| ShopError::Storage(format!("rename {}: {}", path.display(), e)))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ShopResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ShopError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.load("cart"), None);

        storage.save("cart", "[]").unwrap();
        assert_eq!(storage.load("cart").as_deref(), Some("[]"));

        storage.remove("cart").unwrap();
        assert_eq!(storage.load("cart"), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let mut storage = FileStorage::open(dir.path().join("data")).unwrap();
        storage.save("cart", r#"[{"x":1}]"#).unwrap();
        drop(storage);

        let reopened = FileStorage::open(dir.path().join("data")).unwrap();
        assert_eq!(reopened.load("cart").as_deref(), Some(r#"[{"x":1}]"#));
        assert!(!reopened.dir().join("cart.json.tmp").exists());
    }

    #[test]
    fn test_file_storage_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();
        assert!(storage.remove("nothing").is_ok());
    }
}
