//! Durable storage primitives: atomic files and integer preferences.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::PersistenceError;

/// Whole-file storage with atomic replacement.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Replace the file at `path` so readers see either the old or the new bytes.
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), PersistenceError>;

    /// Read the whole file. Absent or unreadable files are `None`.
    async fn read_all(&self, path: &Path) -> Option<Vec<u8>>;
}

/// Integer preference storage, used for the freshness timestamp.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get_int(&self, key: &str) -> Option<i64>;
    async fn set_int(&self, key: &str, value: i64) -> Result<(), PersistenceError>;
}

/// `FileStore` on the local filesystem: stage to `<name>.tmp`, fsync, rename.
#[derive(Debug, Clone, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
        let display = path.display();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PersistenceError::io(parent.display(), e))?;
        }

        let tmp = staging_path(path);
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| PersistenceError::io(tmp.display(), e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| PersistenceError::io(tmp.display(), e))?;
        file.sync_all()
            .await
            .map_err(|e| PersistenceError::io(tmp.display(), e))?;
        drop(file);

        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(PersistenceError::io(display, e));
        }
        Ok(())
    }

    async fn read_all(&self, path: &Path) -> Option<Vec<u8>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read file");
                None
            }
        }
    }
}

/// Preferences kept as one JSON object file, rewritten atomically on every set.
pub struct FilePreferences {
    path: PathBuf,
    files: Arc<dyn FileStore>,
    write_lock: tokio::sync::Mutex<()>,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>, files: Arc<dyn FileStore>) -> Self {
        Self {
            path: path.into(),
            files,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    async fn read_map(&self) -> HashMap<String, i64> {
        let Some(bytes) = self.files.read_all(&self.path).await else {
            return HashMap::new();
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Discarding unreadable preferences");
            HashMap::new()
        })
    }
}

#[async_trait]
impl PreferenceStore for FilePreferences {
    async fn get_int(&self, key: &str) -> Option<i64> {
        self.read_map().await.get(key).copied()
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await;
        map.insert(key.to_string(), value);
        let bytes = serde_json::to_vec(&map)?;
        self.files.write_atomic(&self.path, &bytes).await
    }
}

/// Process-local preferences.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, i64>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    async fn get_int(&self, key: &str) -> Option<i64> {
        self.values.lock().ok()?.get(key).copied()
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<(), PersistenceError> {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_atomic_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");
        let store = LocalFileStore::new();

        assert!(store.read_all(&path).await.is_none());

        store.write_atomic(&path, b"first").await.unwrap();
        store.write_atomic(&path, b"second").await.unwrap();
        assert_eq!(store.read_all(&path).await.unwrap(), b"second");

        // No staging file is left behind
        assert!(!staging_path(&path).exists());
    }

    #[tokio::test]
    async fn test_file_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let prefs = FilePreferences::new(&path, Arc::new(LocalFileStore::new()));

        assert_eq!(prefs.get_int("last").await, None);
        prefs.set_int("last", 1_700_000_000_000).await.unwrap();
        prefs.set_int("other", 5).await.unwrap();

        let reopened = FilePreferences::new(&path, Arc::new(LocalFileStore::new()));
        assert_eq!(reopened.get_int("last").await, Some(1_700_000_000_000));
        assert_eq!(reopened.get_int("other").await, Some(5));
    }

    #[tokio::test]
    async fn test_corrupt_preferences_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, b"{not json").unwrap();

        let prefs = FilePreferences::new(&path, Arc::new(LocalFileStore::new()));
        assert_eq!(prefs.get_int("last").await, None);
        prefs.set_int("last", 9).await.unwrap();
        assert_eq!(prefs.get_int("last").await, Some(9));
    }
}
