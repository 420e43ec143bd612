//! Local snapshot persistence with a paired freshness mark.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::storage::{FilePreferences, FileStore, LocalFileStore, PreferenceStore};
use crate::error::PersistenceError;
use crate::observability::metrics;
use crate::store::Snapshot;

/// File name of the persisted snapshot inside the cache directory.
pub const SNAPSHOT_FILE: &str = "remote_config.json";
/// File name of the preference store inside the cache directory.
pub const PREFERENCES_FILE: &str = "preferences.json";
/// Preference key holding the last successful fetch time (ms since epoch).
pub const FRESHNESS_KEY: &str = "remote_config_last_fetch_ms";

/// Reads and writes the persisted snapshot and its freshness timestamp.
#[derive(Clone)]
pub struct LocalPersistence {
    snapshot_path: PathBuf,
    files: Arc<dyn FileStore>,
    prefs: Arc<dyn PreferenceStore>,
}

impl LocalPersistence {
    pub fn new(
        snapshot_path: impl Into<PathBuf>,
        files: Arc<dyn FileStore>,
        prefs: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            files,
            prefs,
        }
    }

    /// Filesystem-backed persistence rooted at `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new());
        let prefs = Arc::new(FilePreferences::new(dir.join(PREFERENCES_FILE), files.clone()));
        Self::new(dir.join(SNAPSHOT_FILE), files, prefs)
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Load the persisted snapshot. Missing or corrupt files load as empty.
    pub async fn load(&self) -> Snapshot {
        let Some(bytes) = self.files.read_all(&self.snapshot_path).await else {
            return Snapshot::new();
        };
        match serde_json::from_slice::<Snapshot>(&bytes) {
            Ok(snapshot) => {
                tracing::debug!(keys = snapshot.len(), "Loaded persisted snapshot");
                snapshot
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.snapshot_path.display(),
                    error = %e,
                    "Persisted snapshot is unreadable, treating as no cache"
                );
                Snapshot::new()
            }
        }
    }

    /// Atomically replace the persisted snapshot.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec(snapshot)?;
        match self.files.write_atomic(&self.snapshot_path, &bytes).await {
            Ok(()) => {
                tracing::debug!(keys = snapshot.len(), "Saved snapshot to cache file");
                Ok(())
            }
            Err(e) => {
                metrics::record_persist_failure();
                Err(e)
            }
        }
    }

    /// Save a freshly fetched snapshot, then stamp it fresh as of `fetched_at_ms`.
    /// The stamp is only written once the snapshot write has succeeded.
    pub async fn commit_fetch(
        &self,
        snapshot: &Snapshot,
        fetched_at_ms: i64,
    ) -> Result<(), PersistenceError> {
        self.save(snapshot).await?;
        self.prefs.set_int(FRESHNESS_KEY, fetched_at_ms).await.inspect_err(|_| {
            metrics::record_persist_failure();
        })
    }

    /// Time of the last committed fetch, if any.
    pub async fn last_fetch(&self) -> Option<i64> {
        self.prefs.get_int(FRESHNESS_KEY).await
    }
}

impl std::fmt::Debug for LocalPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalPersistence")
            .field("snapshot_path", &self.snapshot_path)
            .finish()
    }
}
