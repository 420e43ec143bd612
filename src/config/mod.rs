//! Settings subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings → RemoteConfig builder, transports, admin API
//!
//! On file change:
//!     watcher.rs reloads + validates
//!     → daemon replaces the engine defaults from [defaults]
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal files
//! - Only the defaults table is hot-reloadable; everything else needs a restart
//! - API keys are read from the environment, never from the file

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_settings, parse_settings, ConfigError};
pub use schema::{AdminConfig, CacheSettings, ObservabilityConfig, RealtimeSettings, RemoteSettings, Settings};
pub use validation::ValidationError;
