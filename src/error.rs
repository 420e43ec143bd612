//! Error taxonomy for the resolution engine.

use thiserror::Error;

/// Errors produced while resolving or synchronizing remote config.
#[derive(Debug, Error)]
pub enum RemoteConfigError {
    /// Query or realtime channel failure (network, auth, unknown collection).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A fetched document lacks the configured key or value attribute.
    #[error("Document '{document}' is missing attribute '{attribute}'")]
    Schema { document: String, attribute: String },

    /// Local snapshot or preference storage failure.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Required setup was not performed before use.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RemoteConfigError {
    /// Short, stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteConfigError::Transport(_) => "transport",
            RemoteConfigError::Schema { .. } => "schema",
            RemoteConfigError::Persistence(_) => "persistence",
            RemoteConfigError::Configuration(_) => "configuration",
        }
    }
}

impl From<reqwest::Error> for RemoteConfigError {
    fn from(e: reqwest::Error) -> Self {
        RemoteConfigError::Transport(e.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for RemoteConfigError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        RemoteConfigError::Transport(e.to_string())
    }
}

/// Errors from the local file and preference stores.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PersistenceError {
    pub fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.to_string(),
            source,
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, RemoteConfigError>;
