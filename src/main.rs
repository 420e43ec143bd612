//! remote-configd: keeps a local remote-config snapshot current.
//!
//! # Architecture Overview
//!
//! ```text
//!   settings.toml ──▶ loader ──▶ startup ──▶ RemoteConfig ◀──── admin API (axum)
//!        │                                    │      ▲
//!        │ notify                 fetch_and_activate  │ patch
//!        ▼                                    │      │
//!   watcher ──▶ set_defaults          HTTP documents  realtime reconciler ◀── WebSocket
//!                                             │
//!                                   cache dir: remote_config.json + preferences.json
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use remote_config::admin::{self, AdminState};
use remote_config::config::load_settings;
use remote_config::config::watcher::SettingsWatcher;
use remote_config::lifecycle::{signals, startup, Shutdown};
use remote_config::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "remote-configd")]
#[command(about = "Remote config synchronization daemon", long_about = None)]
struct Args {
    /// Path to the TOML settings file.
    #[arg(short, long, default_value = "remote-config.toml")]
    config: PathBuf,

    /// Do not reload the defaults table when the settings file changes.
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let settings = load_settings(&args.config)?;

    logging::init_logging(&settings.observability.log_level);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "remote-configd starting"
    );

    if settings.observability.metrics_enabled {
        match settings.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %settings.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let engine = startup::build_engine(&settings)?;
    let outcome = engine.fetch_and_activate().await;
    tracing::info!(outcome = %outcome, keys = engine.keys().len(), "Initial resolution complete");

    let shutdown = Shutdown::new();
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();

    if let Some(reconciler) = startup::build_reconciler(&settings, engine.clone())? {
        tasks.push(tokio::spawn(reconciler.run(shutdown.subscribe())));
    }

    // Dropping the watcher stops it, so it lives until main returns
    let _watcher = if args.no_watch {
        None
    } else {
        let (watcher, mut updates) = SettingsWatcher::new(&args.config);
        let watcher = watcher.run()?;
        let engine = engine.clone();
        let mut stop = shutdown.subscribe();
        tasks.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = updates.recv() => match update {
                        Some(settings) => engine.set_defaults(settings.defaults_snapshot()).await,
                        None => break,
                    },
                    _ = stop.recv() => break,
                }
            }
        }));
        Some(watcher)
    };

    if settings.admin.enabled {
        let listener = TcpListener::bind(&settings.admin.bind_address).await?;
        let state = AdminState::new(engine.clone(), &settings.admin.api_key);
        let signal = shutdown.subscribe();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = admin::serve(listener, state, signal).await {
                tracing::error!(error = %e, "Admin API failed");
            }
        }));
    }

    signals::wait_for_termination().await;
    shutdown.trigger();

    for task in tasks {
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "Background task ended abnormally");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
