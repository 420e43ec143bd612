//! Startup orchestration: settings → engine and transports.
//!
//! # Design Decisions
//! - Fail fast: a missing collaborator or bad endpoint is fatal at startup
//! - The engine is built once here and shared by `Arc`; there is no global

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::LocalPersistence;
use crate::config::Settings;
use crate::engine::RemoteConfig;
use crate::error::Result;
use crate::realtime::{RealtimeReconciler, WebSocketRealtime};
use crate::remote::HttpDocumentTransport;
use crate::resilience::ReconnectPolicy;

/// Build the engine with the HTTP document transport and on-disk cache.
pub fn build_engine(settings: &Settings) -> Result<Arc<RemoteConfig>> {
    let remote = &settings.remote;
    let api_key = remote.api_key();
    if api_key.is_none() {
        tracing::debug!(env = %remote.api_key_env, "No API key in environment, using project access only");
    }

    let transport = HttpDocumentTransport::new(
        &remote.endpoint,
        &remote.project_id,
        api_key,
        Duration::from_secs(remote.request_timeout_secs),
    )?;

    let engine = RemoteConfig::builder()
        .scope(remote.scope())
        .attributes(remote.attributes())
        .cache_ttl_hours(settings.cache.ttl_hours)
        .defaults(settings.defaults_snapshot())
        .document_transport(Arc::new(transport))
        .persistence(LocalPersistence::in_dir(Path::new(&settings.cache.directory)))
        .build()?;

    tracing::info!(
        endpoint = %remote.endpoint,
        database = %remote.database_id,
        collection = %remote.collection_id,
        ttl_hours = settings.cache.ttl_hours,
        "Remote config engine initialized"
    );
    Ok(Arc::new(engine))
}

/// Build the realtime reconciler, or `None` when realtime is disabled.
pub fn build_reconciler(settings: &Settings, engine: Arc<RemoteConfig>) -> Result<Option<RealtimeReconciler>> {
    let realtime = &settings.realtime;
    if !realtime.enabled {
        tracing::info!("Realtime updates disabled");
        return Ok(None);
    }

    let endpoint = realtime.resolved_endpoint(&settings.remote);
    let transport = WebSocketRealtime::new(
        &endpoint,
        &settings.remote.project_id,
        Duration::from_secs(realtime.heartbeat_secs),
    )?;

    let reconciler = RealtimeReconciler::new(engine, Arc::new(transport)).with_reconnect(ReconnectPolicy {
        base_delay_ms: realtime.reconnect_base_ms,
        max_delay_ms: realtime.reconnect_max_ms,
    });
    Ok(Some(reconciler))
}
