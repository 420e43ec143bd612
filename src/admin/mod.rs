//! Admin API over the running engine.
//!
//! ```text
//! GET  /admin/status        engine and cache state
//! GET  /admin/config        merged view (defaults overlaid by active)
//! GET  /admin/config/{key}  single value with its source
//! POST /admin/refresh       run fetch_and_activate now
//! ```
//! Every route requires the bearer token from `admin.api_key`.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::engine::RemoteConfig;
use crate::lifecycle::ShutdownSignal;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// Shared state for admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub engine: Arc<RemoteConfig>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(engine: Arc<RemoteConfig>, api_key: &str) -> Self {
        Self {
            engine,
            api_key: Arc::from(api_key),
        }
    }
}

#[allow(deprecated)]
pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/config", get(list_config))
        .route("/admin/config/{key}", get(get_config))
        .route("/admin/refresh", post(refresh))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin API until shutdown.
pub async fn serve(
    listener: TcpListener,
    state: AdminState,
    mut shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move { shutdown.recv().await })
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
