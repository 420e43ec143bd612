//! Resilience helpers.
//!
//! # Design Decisions
//! - Realtime resubscription backs off exponentially with jitter
//! - Remote fetches are not retried here; a failed fetch falls back to cache
//!   or defaults and the caller decides when to try again

pub mod backoff;

pub use backoff::ReconnectPolicy;
