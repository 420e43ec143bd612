//! Resolution engine.
//!
//! # Data Flow
//! ```text
//! fetch_and_activate
//!     → cache gate fresh and persisted snapshot non-empty?  → Cache
//!     → fetch reducer (pages outside the write lock)
//!         non-empty  → replace active + commit to disk       → Network
//!         empty      → persisted snapshot or defaults        → Cache | Defaults
//!         error      → persisted snapshot or defaults        → Failure(cause)
//!
//! realtime reconciler
//!     → patch (same write lock) → replace active + save
//! ```
//!
//! # Concurrency
//! - `write_lock` makes "read active, replace active, write file" one critical
//!   section for fetches and patches alike; the later writer wins
//! - `fetch_lock` keeps at most one remote fetch in flight
//! - Getters read through `ArcSwap` and never wait on either lock

pub mod builder;
pub mod outcome;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::cache::{CacheGate, Clock, LocalPersistence};
use crate::error::PersistenceError;
use crate::observability::metrics;
use crate::remote::{AttributeMapping, CollectionScope, DocumentTransport, RemoteFetchReducer};
use crate::store::{Snapshot, SnapshotStore};

pub use builder::{RemoteConfigBuilder, DEFAULT_CACHE_TTL_HOURS};
pub use outcome::FetchOutcome;

/// Remote config client: one instance per collection, shared as `Arc<RemoteConfig>`.
pub struct RemoteConfig {
    scope: CollectionScope,
    attributes: AttributeMapping,
    store: SnapshotStore,
    gate: CacheGate,
    reducer: RemoteFetchReducer,
    persistence: LocalPersistence,
    clock: Arc<dyn Clock>,
    /// Active snapshot is a copy of the defaults, so default reloads must reach it.
    serving_defaults: AtomicBool,
    write_lock: Mutex<()>,
    fetch_lock: Mutex<()>,
}

impl RemoteConfig {
    pub fn builder() -> RemoteConfigBuilder {
        RemoteConfigBuilder::new()
    }

    pub(crate) fn from_parts(
        scope: CollectionScope,
        attributes: AttributeMapping,
        cache_ttl_hours: u64,
        defaults: Snapshot,
        documents: Arc<dyn DocumentTransport>,
        persistence: LocalPersistence,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let reducer = RemoteFetchReducer::new(documents, scope.clone(), attributes.clone());
        Self {
            scope,
            attributes,
            store: SnapshotStore::new(defaults),
            gate: CacheGate::new(cache_ttl_hours),
            reducer,
            persistence,
            clock,
            serving_defaults: AtomicBool::new(false),
            write_lock: Mutex::new(()),
            fetch_lock: Mutex::new(()),
        }
    }

    /// Resolve the active snapshot from cache, network, or fallback.
    /// Never fails; errors surface as [`FetchOutcome::Failure`].
    pub async fn fetch_and_activate(&self) -> FetchOutcome {
        let fetch_id = Uuid::new_v4();
        let started = Instant::now();
        let outcome = self
            .resolve()
            .instrument(tracing::info_span!("fetch_and_activate", %fetch_id))
            .await;

        metrics::record_fetch(outcome.tag(), started);
        match &outcome {
            FetchOutcome::Failure(e) => tracing::warn!(
                %fetch_id,
                error = %e,
                error_kind = e.kind(),
                "Remote config resolved from fallback after fetch failure"
            ),
            other => tracing::info!(
                %fetch_id,
                outcome = other.tag(),
                keys = self.store.active().len(),
                "Remote config activated"
            ),
        }
        outcome
    }

    async fn resolve(&self) -> FetchOutcome {
        let _in_flight = self.fetch_lock.lock().await;

        if self.is_cache_valid().await {
            let _guard = self.write_lock.lock().await;
            let cached = self.persistence.load().await;
            if !cached.is_empty() {
                self.activate(cached, false);
                return FetchOutcome::Cache;
            }
            tracing::debug!("Cache is fresh but empty, fetching");
        }

        match self.reducer.fetch_all().await {
            Ok(snapshot) if !snapshot.is_empty() => {
                self.activate_fetched(snapshot).await;
                FetchOutcome::Network
            }
            Ok(_) => {
                tracing::info!(collection = %self.scope.collection_id, "Remote collection is empty");
                self.fall_back().await
            }
            Err(e) => {
                self.fall_back().await;
                FetchOutcome::Failure(e)
            }
        }
    }

    async fn activate_fetched(&self, snapshot: Snapshot) {
        let _guard = self.write_lock.lock().await;
        self.activate(snapshot.clone(), false);
        if let Err(e) = self
            .persistence
            .commit_fetch(&snapshot, self.clock.now_ms())
            .await
        {
            tracing::warn!(
                error = %e,
                "Failed to persist fetched snapshot; in-memory config stays active, cache stays stale"
            );
        }
    }

    /// Activate the persisted snapshot if there is one, otherwise the defaults.
    async fn fall_back(&self) -> FetchOutcome {
        let _guard = self.write_lock.lock().await;
        let persisted = self.persistence.load().await;
        if !persisted.is_empty() {
            self.activate(persisted, false);
            FetchOutcome::Cache
        } else {
            self.activate((*self.store.defaults()).clone(), true);
            FetchOutcome::Defaults
        }
    }

    fn activate(&self, snapshot: Snapshot, from_defaults: bool) {
        metrics::record_snapshot_size(snapshot.len());
        self.store.replace_active(snapshot);
        self.serving_defaults.store(from_defaults, Ordering::Release);
    }

    /// Apply a change to the active snapshot and persist the result, as one
    /// critical section shared with fetches.
    pub(crate) async fn patch<F>(&self, apply: F) -> Result<(), PersistenceError>
    where
        F: FnOnce(&mut Snapshot),
    {
        let _guard = self.write_lock.lock().await;
        let mut next = (*self.store.active()).clone();
        apply(&mut next);
        self.activate(next.clone(), false);
        self.persistence.save(&next).await
    }

    /// Whether the persisted snapshot is within its TTL right now.
    pub async fn is_cache_valid(&self) -> bool {
        let last = self.persistence.last_fetch().await;
        self.gate.is_fresh(last, self.clock.now_ms())
    }

    /// Time of the last committed fetch (ms since epoch).
    pub async fn last_fetch(&self) -> Option<i64> {
        self.persistence.last_fetch().await
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    pub fn get_string(&self, key: &str) -> String {
        self.store.get_string(key)
    }

    pub fn get_int(&self, key: &str) -> i64 {
        self.store.get_int(key)
    }

    pub fn get_float(&self, key: &str) -> f64 {
        self.store.get_float(key)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.store.get_bool(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.keys()
    }

    pub fn all(&self) -> Snapshot {
        self.store.all()
    }

    /// Replace the caller defaults. A remote or cached active snapshot is
    /// untouched; one resolved from the defaults is replaced as well.
    pub async fn set_defaults(&self, defaults: Snapshot) {
        let _guard = self.write_lock.lock().await;
        let reactivate = self.serving_defaults();
        tracing::info!(keys = defaults.len(), reactivate, "Defaults replaced");
        if reactivate {
            self.activate(defaults.clone(), true);
        }
        self.store.replace_defaults(defaults);
    }

    /// Whether the active snapshot is the defaults fallback rather than remote data.
    pub fn serving_defaults(&self) -> bool {
        self.serving_defaults.load(Ordering::Acquire)
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn scope(&self) -> &CollectionScope {
        &self.scope
    }

    pub fn attributes(&self) -> &AttributeMapping {
        &self.attributes
    }

    pub fn persistence(&self) -> &LocalPersistence {
        &self.persistence
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("scope", &self.scope)
            .field("attributes", &self.attributes)
            .field("ttl", &self.gate.ttl())
            .field("persistence", &self.persistence)
            .finish()
    }
}
