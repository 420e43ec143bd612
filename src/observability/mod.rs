//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! engine, reconciler, persistence
//!     → logging.rs (tracing events, fetch_id span per resolution)
//!     → metrics.rs (fetch outcomes, pages, patches, snapshot size)
//! ```

pub mod logging;
pub mod metrics;
