//! Realtime synchronization subsystem.
//!
//! # Data Flow
//! ```text
//! RealtimeTransport::subscribe(channel)   (websocket.rs in production)
//!     → stream of RealtimeEvent | Err(malformed)
//!     → reconciler.rs
//!         delete  → remove key, persist        (filter never consulted)
//!         upsert  → filter(key, value)?
//!                     true  → insert, persist
//!                     false → drop (memory and disk untouched)
//! ```
//!
//! # Design Decisions
//! - A bad event is logged and skipped; only shutdown stops the reconciler
//! - Ended or failed subscriptions are retried with jittered backoff

pub mod event;
pub mod reconciler;
pub mod websocket;

pub use event::{EventStream, RealtimeEvent, RealtimeTransport};
pub use reconciler::{PatchFilter, PatchOutcome, RealtimeReconciler};
pub use websocket::WebSocketRealtime;
