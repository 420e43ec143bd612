//! Metrics collection and exposition.
//!
//! # Metrics
//! - `remote_config_fetch_total` (counter): resolutions by outcome
//! - `remote_config_fetch_duration_seconds` (histogram): resolution latency
//! - `remote_config_pages_total` (counter): document pages requested
//! - `remote_config_patch_total` (counter): realtime deltas by kind, applied
//! - `remote_config_snapshot_keys` (gauge): keys in the active snapshot
//! - `remote_config_persist_failures_total` (counter): failed local writes
//!
//! Recording is a no-op until a recorder is installed, so the library can be
//! embedded without an exporter.

use std::net::SocketAddr;
use std::time::Instant;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_fetch(outcome: &'static str, started: Instant) {
    metrics::counter!("remote_config_fetch_total", "outcome" => outcome).increment(1);
    metrics::histogram!("remote_config_fetch_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_page_fetched() {
    metrics::counter!("remote_config_pages_total").increment(1);
}

pub fn record_patch(kind: &'static str, applied: bool) {
    let applied = if applied { "true" } else { "false" };
    metrics::counter!("remote_config_patch_total", "kind" => kind, "applied" => applied).increment(1);
}

pub fn record_snapshot_size(keys: usize) {
    metrics::gauge!("remote_config_snapshot_keys").set(keys as f64);
}

pub fn record_persist_failure() {
    metrics::counter!("remote_config_persist_failures_total").increment(1);
}
