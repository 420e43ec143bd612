//! Settings file schema.
//!
//! Every section carries `#[serde(default)]`, so an empty file is a valid
//! (if not very useful) configuration.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::remote::{AttributeMapping, CollectionScope};
use crate::store::Snapshot;

/// Root settings for the remote config daemon.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Document API connection and collection mapping.
    pub remote: RemoteSettings,

    /// Local snapshot cache.
    pub cache: CacheSettings,

    /// Realtime push channel.
    pub realtime: RealtimeSettings,

    /// Fallback values, consulted when a key is missing remotely.
    pub defaults: BTreeMap<String, DefaultValue>,

    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,
}

impl Settings {
    /// Defaults table in canonical text form.
    pub fn defaults_snapshot(&self) -> Snapshot {
        self.defaults
            .iter()
            .map(|(k, v)| (k.clone(), v.to_text()))
            .collect()
    }
}

/// A scalar from the `[defaults]` table, stringified on load.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl DefaultValue {
    pub fn to_text(&self) -> String {
        match self {
            DefaultValue::Text(s) => s.clone(),
            DefaultValue::Integer(i) => i.to_string(),
            DefaultValue::Float(f) => f.to_string(),
            DefaultValue::Boolean(b) => b.to_string(),
        }
    }
}

/// Document API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// REST endpoint, e.g. "https://cloud.example.com/v1".
    pub endpoint: String,

    /// Project identifier sent with every request.
    pub project_id: String,

    /// Environment variable holding the API key. Keys never live in the file.
    pub api_key_env: String,

    pub database_id: String,

    pub collection_id: String,

    /// Document field holding the config key.
    pub key_attribute: String,

    /// Document field holding the config value.
    pub value_attribute: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl RemoteSettings {
    pub fn scope(&self) -> CollectionScope {
        CollectionScope::new(&self.database_id, &self.collection_id)
    }

    pub fn attributes(&self) -> AttributeMapping {
        AttributeMapping {
            key: self.key_attribute.clone(),
            value: self.value_attribute.clone(),
        }
    }

    /// API key from the configured environment variable, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        let scope = CollectionScope::default();
        let attributes = AttributeMapping::default();
        Self {
            endpoint: "http://localhost/v1".to_string(),
            project_id: String::new(),
            api_key_env: "REMOTE_CONFIG_API_KEY".to_string(),
            database_id: scope.database_id,
            collection_id: scope.collection_id,
            key_attribute: attributes.key,
            value_attribute: attributes.value,
            request_timeout_secs: 10,
        }
    }
}

/// Local cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Directory holding the snapshot and preference files.
    pub directory: String,

    /// Hours a fetched snapshot stays valid (0 = always refetch).
    pub ttl_hours: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: ".remote_config".to_string(),
            ttl_hours: crate::engine::DEFAULT_CACHE_TTL_HOURS,
        }
    }
}

/// Realtime channel settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RealtimeSettings {
    pub enabled: bool,

    /// WebSocket endpoint. Derived from `remote.endpoint` when unset.
    pub endpoint: Option<String>,

    /// Seconds between client heartbeat frames.
    pub heartbeat_secs: u64,

    /// Base delay for resubscription backoff in milliseconds.
    pub reconnect_base_ms: u64,

    /// Maximum delay for resubscription backoff in milliseconds.
    pub reconnect_max_ms: u64,
}

impl RealtimeSettings {
    /// Configured endpoint, or `<remote endpoint>/realtime` with a ws scheme.
    pub fn resolved_endpoint(&self, remote: &RemoteSettings) -> String {
        if let Some(endpoint) = &self.endpoint {
            return endpoint.clone();
        }
        let base = remote.endpoint.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        format!("{}/realtime", base)
    }
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: None,
            heartbeat_secs: 20,
            reconnect_base_ms: 500,
            reconnect_max_ms: 30_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    pub enabled: bool,

    /// Bearer token required on every admin request.
    pub api_key: String,

    pub bind_address: String,
}

/// Placeholder admin key; validation refuses it when the admin API is enabled.
pub const PLACEHOLDER_ADMIN_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_ADMIN_KEY.to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
