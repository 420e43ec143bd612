//! Snapshot store: the active config map plus caller defaults.
//!
//! # Resolution Order
//! ```text
//! get(key)
//!     → active snapshot (last fetch, load, or patch)
//!     → defaults (caller supplied)
//!     → None
//! ```
//!
//! # Design Decisions
//! - Values are canonical text; typed getters parse on read
//! - Both maps live behind `ArcSwap`, so getters never block on a writer
//! - Writers replace whole maps; serialization of writers is the engine's job

pub mod typed;

use std::collections::HashMap;
use std::sync::Arc;
use arc_swap::ArcSwap;

/// Key → text value mapping. Iteration order carries no meaning.
pub type Snapshot = HashMap<String, String>;

/// Thread-safe holder of the active snapshot and the defaults map.
pub struct SnapshotStore {
    active: ArcSwap<Snapshot>,
    defaults: ArcSwap<Snapshot>,
}

impl SnapshotStore {
    /// Create a store with an empty active snapshot.
    pub fn new(defaults: Snapshot) -> Self {
        Self {
            active: ArcSwap::from_pointee(Snapshot::new()),
            defaults: ArcSwap::from_pointee(defaults),
        }
    }

    /// Resolve a key against the active snapshot, then defaults.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.active.load().get(key) {
            return Some(value.clone());
        }
        self.defaults.load().get(key).cloned()
    }

    /// Raw text, or an empty string when the key is unknown.
    pub fn get_string(&self, key: &str) -> String {
        self.get(key).unwrap_or_default()
    }

    /// Integer interpretation, 0 when absent or unparsable.
    pub fn get_int(&self, key: &str) -> i64 {
        self.get(key).map(|v| typed::parse_int(&v)).unwrap_or(0)
    }

    /// Float interpretation, 0.0 when absent or unparsable.
    pub fn get_float(&self, key: &str) -> f64 {
        self.get(key).map(|v| typed::parse_float(&v)).unwrap_or(0.0)
    }

    /// Truthy-set membership; false when absent.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).map(|v| typed::parse_bool(&v)).unwrap_or(false)
    }

    /// Every resolvable key, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.all().into_keys().collect();
        keys.sort();
        keys
    }

    /// Merged view: defaults overlaid by the active snapshot.
    pub fn all(&self) -> Snapshot {
        let mut merged = (**self.defaults.load()).clone();
        for (k, v) in self.active.load().iter() {
            merged.insert(k.clone(), v.clone());
        }
        merged
    }

    /// Current active snapshot.
    pub fn active(&self) -> Arc<Snapshot> {
        self.active.load_full()
    }

    /// Current defaults map.
    pub fn defaults(&self) -> Arc<Snapshot> {
        self.defaults.load_full()
    }

    pub(crate) fn replace_active(&self, snapshot: Snapshot) {
        self.active.store(Arc::new(snapshot));
    }

    /// Replace the defaults map wholesale.
    pub fn replace_defaults(&self, defaults: Snapshot) {
        self.defaults.store(Arc::new(defaults));
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(Snapshot::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(&str, &str)]) -> Snapshot {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_absent_key_fallbacks() {
        let store = SnapshotStore::default();
        assert_eq!(store.get("missing"), None);
        assert_eq!(store.get_string("missing"), "");
        assert_eq!(store.get_int("missing"), 0);
        assert_eq!(store.get_float("missing"), 0.0);
        assert!(!store.get_bool("missing"));
    }

    #[test]
    fn test_active_overrides_defaults() {
        let store = SnapshotStore::new(snapshot(&[("theme", "light"), ("retries", "3")]));
        store.replace_active(snapshot(&[("theme", "dark")]));

        assert_eq!(store.get_string("theme"), "dark");
        assert_eq!(store.get_int("retries"), 3);

        let all = store.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all["theme"], "dark");
        assert_eq!(store.keys(), vec!["retries".to_string(), "theme".to_string()]);
    }

    #[test]
    fn test_typed_getters() {
        let store = SnapshotStore::default();
        store.replace_active(snapshot(&[
            ("flag", "ON"),
            ("off", "nope"),
            ("count", "17"),
            ("bad", "seventeen"),
            ("ratio", "0.25"),
        ]));

        assert!(store.get_bool("flag"));
        assert!(!store.get_bool("off"));
        assert_eq!(store.get_int("count"), 17);
        assert_eq!(store.get_int("bad"), 0);
        assert_eq!(store.get_float("ratio"), 0.25);
    }

    #[test]
    fn test_replace_defaults() {
        let store = SnapshotStore::new(snapshot(&[("a", "1")]));
        store.replace_defaults(snapshot(&[("b", "2")]));
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get_int("b"), 2);
    }
}
