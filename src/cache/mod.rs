//! Local cache subsystem.
//!
//! # Data Flow
//! ```text
//! successful fetch
//!     → persistence.rs (stage + rename snapshot file)
//!     → storage.rs (freshness timestamp, only after the snapshot landed)
//!
//! fetch_and_activate
//!     → gate.rs (now - last_fetch <= ttl ?)
//!     → persistence.rs load (corrupt or missing file = no cache)
//! ```
//!
//! # Design Decisions
//! - Load never fails; unreadable state is indistinguishable from no state
//! - A failed snapshot write never advances the freshness timestamp

pub mod gate;
pub mod persistence;
pub mod storage;

pub use gate::{CacheGate, Clock, SystemClock};
pub use persistence::LocalPersistence;
pub use storage::{FilePreferences, FileStore, LocalFileStore, MemoryPreferences, PreferenceStore};
