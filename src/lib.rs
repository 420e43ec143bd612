//! Remote config client: layered resolution of application settings from a
//! remote document collection, a local snapshot cache, caller defaults, and
//! realtime deltas.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use remote_config::{FetchOutcome, HttpDocumentTransport, LocalPersistence, RemoteConfig};
//!
//! # async fn run() -> remote_config::error::Result<()> {
//! let transport = HttpDocumentTransport::new(
//!     "https://cloud.example.com/v1",
//!     "my-project",
//!     None,
//!     Duration::from_secs(10),
//! )?;
//! let config = RemoteConfig::builder()
//!     .document_transport(Arc::new(transport))
//!     .persistence(LocalPersistence::in_dir(std::path::Path::new(".remote_config")))
//!     .build()?;
//!
//! if let FetchOutcome::Failure(e) = config.fetch_and_activate().await {
//!     eprintln!("using fallback config: {e}");
//! }
//! let cdn = config.get_string("cdnUrl");
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod realtime;
pub mod remote;
pub mod resilience;
pub mod store;

pub use cache::LocalPersistence;
pub use engine::{FetchOutcome, RemoteConfig, RemoteConfigBuilder};
pub use error::RemoteConfigError;
pub use realtime::{RealtimeReconciler, WebSocketRealtime};
pub use remote::HttpDocumentTransport;
pub use store::Snapshot;
