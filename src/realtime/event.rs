//! Realtime event model and the subscription contract.

use std::pin::Pin;
use async_trait::async_trait;
use futures_util::Stream;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// One push event for a document in the watched collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RealtimeEvent {
    /// Event descriptors, e.g. `databases.db.collections.col.documents.abc.update`.
    #[serde(default)]
    pub events: Vec<String>,
    /// Channels the event was delivered on.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Document fields.
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl RealtimeEvent {
    pub fn new(events: Vec<String>, payload: Map<String, Value>) -> Self {
        Self {
            events,
            channels: Vec::new(),
            payload,
        }
    }

    /// True when any descriptor carries a `delete` segment.
    pub fn is_delete(&self) -> bool {
        self.events
            .iter()
            .any(|event| event.split('.').any(|segment| segment == "delete"))
    }
}

/// Stream of events; an `Err` item is one bad delivery, not the end of the stream.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<RealtimeEvent>> + Send>>;

/// Push-channel subscription.
#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    async fn subscribe(&self, channel: &str) -> Result<EventStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(descriptors: &[&str]) -> RealtimeEvent {
        RealtimeEvent::new(descriptors.iter().map(|s| s.to_string()).collect(), Map::new())
    }

    #[test]
    fn test_delete_detection() {
        assert!(event(&["databases.rc.collections.release.documents.abc.delete"]).is_delete());
        assert!(event(&[
            "databases.*.collections.*.documents.*",
            "databases.*.collections.*.documents.*.delete",
        ])
        .is_delete());
        assert!(!event(&["databases.rc.collections.release.documents.abc.update"]).is_delete());
        assert!(!event(&["databases.rc.collections.deleted_flags.documents.abc.create"]).is_delete());
        assert!(!event(&[]).is_delete());
    }
}
