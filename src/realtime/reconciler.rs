//! Applies realtime deltas to the active snapshot.

use std::sync::Arc;
use futures_util::StreamExt;

use crate::engine::RemoteConfig;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::realtime::event::{RealtimeEvent, RealtimeTransport};
use crate::remote::document::value_to_text;
use crate::resilience::ReconnectPolicy;

/// Caller gate for upserts: `true` applies the delta, `false` drops it.
pub type PatchFilter = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// What happened to one realtime event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Key removed and the snapshot persisted.
    Deleted(String),
    /// Key upserted and the snapshot persisted.
    Applied(String),
    /// Filter rejected the upsert; nothing changed.
    Filtered(String),
    /// Payload lacked the key or value attribute.
    Malformed,
    /// Memory was updated but the snapshot write failed.
    PersistFailed(String),
}

/// Keeps the realtime subscription alive and feeds its events into the engine.
pub struct RealtimeReconciler {
    engine: Arc<RemoteConfig>,
    transport: Arc<dyn RealtimeTransport>,
    filter: PatchFilter,
    reconnect: ReconnectPolicy,
}

impl RealtimeReconciler {
    /// Reconciler that applies every upsert.
    pub fn new(engine: Arc<RemoteConfig>, transport: Arc<dyn RealtimeTransport>) -> Self {
        Self {
            engine,
            transport,
            filter: Arc::new(|_, _| true),
            reconnect: ReconnectPolicy::default(),
        }
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.filter = Arc::new(filter);
        self
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Apply one event. Deletes bypass the filter; upserts are fully gated by it.
    pub async fn handle_event(&self, event: &RealtimeEvent) -> PatchOutcome {
        let attributes = self.engine.attributes();
        let Some(key) = event.payload.get(&attributes.key).and_then(value_to_text) else {
            tracing::warn!(events = ?event.events, "Realtime payload without key attribute, dropping");
            metrics::record_patch("malformed", false);
            return PatchOutcome::Malformed;
        };

        if event.is_delete() {
            let result = self
                .engine
                .patch(|snapshot| {
                    snapshot.remove(&key);
                })
                .await;
            metrics::record_patch("delete", result.is_ok());
            return match result {
                Ok(()) => {
                    tracing::info!(key = %key, "Realtime delete applied");
                    PatchOutcome::Deleted(key)
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Realtime delete not persisted");
                    PatchOutcome::PersistFailed(key)
                }
            };
        }

        let Some(value) = event.payload.get(&attributes.value).and_then(value_to_text) else {
            tracing::warn!(key = %key, "Realtime payload without value attribute, dropping");
            metrics::record_patch("malformed", false);
            return PatchOutcome::Malformed;
        };

        if !(self.filter)(&key, &value) {
            tracing::debug!(key = %key, "Realtime upsert rejected by filter");
            metrics::record_patch("upsert", false);
            return PatchOutcome::Filtered(key);
        }

        let result = self
            .engine
            .patch(|snapshot| {
                snapshot.insert(key.clone(), value);
            })
            .await;
        metrics::record_patch("upsert", result.is_ok());
        match result {
            Ok(()) => {
                tracing::info!(key = %key, "Realtime upsert applied");
                PatchOutcome::Applied(key)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Realtime upsert not persisted");
                PatchOutcome::PersistFailed(key)
            }
        }
    }

    /// Subscribe and apply events until shutdown, resubscribing with backoff
    /// whenever the subscription fails or ends.
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        let channel = self.engine.scope().channel();
        let mut attempt: u32 = 0;

        loop {
            let subscribed = tokio::select! {
                result = self.transport.subscribe(&channel) => result,
                _ = shutdown.recv() => break,
            };

            match subscribed {
                Ok(mut events) => {
                    attempt = 0;
                    tracing::info!(channel = %channel, "Realtime reconciler subscribed");
                    loop {
                        tokio::select! {
                            item = events.next() => match item {
                                Some(Ok(event)) => {
                                    self.handle_event(&event).await;
                                }
                                Some(Err(e)) => {
                                    tracing::warn!(error = %e, "Dropping undeliverable realtime event");
                                }
                                None => {
                                    tracing::warn!(channel = %channel, "Realtime subscription ended");
                                    break;
                                }
                            },
                            _ = shutdown.recv() => {
                                tracing::info!("Realtime reconciler received shutdown signal");
                                return;
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(channel = %channel, error = %e, "Realtime subscribe failed");
                }
            }

            attempt = attempt.saturating_add(1);
            let delay = self.reconnect.delay(attempt);
            tracing::debug!(attempt, delay = ?delay, "Resubscribing to realtime channel");
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!("Realtime reconciler stopped");
    }
}
