//! Explicit construction of a `RemoteConfig` instance.

use std::sync::Arc;

use crate::cache::{Clock, LocalPersistence, SystemClock};
use crate::engine::RemoteConfig;
use crate::error::{RemoteConfigError, Result};
use crate::remote::{AttributeMapping, CollectionScope, DocumentTransport};
use crate::store::Snapshot;

/// Cache TTL used when none is configured.
pub const DEFAULT_CACHE_TTL_HOURS: u64 = 24;

/// Builder for [`RemoteConfig`]. Every setting has a default except the
/// document transport and the persistence layer.
pub struct RemoteConfigBuilder {
    scope: CollectionScope,
    attributes: AttributeMapping,
    cache_ttl_hours: u64,
    defaults: Snapshot,
    documents: Option<Arc<dyn DocumentTransport>>,
    persistence: Option<LocalPersistence>,
    clock: Arc<dyn Clock>,
}

impl RemoteConfigBuilder {
    pub(crate) fn new() -> Self {
        Self {
            scope: CollectionScope::default(),
            attributes: AttributeMapping::default(),
            cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
            defaults: Snapshot::new(),
            documents: None,
            persistence: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn scope(mut self, scope: CollectionScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn attributes(mut self, attributes: AttributeMapping) -> Self {
        self.attributes = attributes;
        self
    }

    /// Hours a fetched snapshot stays valid. Zero disables the cache.
    pub fn cache_ttl_hours(mut self, hours: u64) -> Self {
        self.cache_ttl_hours = hours;
        self
    }

    pub fn defaults(mut self, defaults: Snapshot) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn document_transport(mut self, transport: Arc<dyn DocumentTransport>) -> Self {
        self.documents = Some(transport);
        self
    }

    pub fn persistence(mut self, persistence: LocalPersistence) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<RemoteConfig> {
        let documents = self.documents.ok_or_else(|| {
            RemoteConfigError::Configuration("document transport not set".to_string())
        })?;
        let persistence = self.persistence.ok_or_else(|| {
            RemoteConfigError::Configuration("local persistence not set".to_string())
        })?;

        let required = [
            ("database_id", &self.scope.database_id),
            ("collection_id", &self.scope.collection_id),
            ("key attribute", &self.attributes.key),
            ("value attribute", &self.attributes.value),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(RemoteConfigError::Configuration(format!("{} must not be empty", name)));
        }

        Ok(RemoteConfig::from_parts(
            self.scope,
            self.attributes,
            self.cache_ttl_hours,
            self.defaults,
            documents,
            persistence,
            self.clock,
        ))
    }
}
