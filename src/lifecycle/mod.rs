//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Settings → engine (HTTP transport + disk cache) → realtime reconciler
//!
//! Shutdown (shutdown.rs):
//!     Signal received (signals.rs) → trigger → reconciler and admin API exit
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
