//! Result tag of one resolution attempt.

use crate::error::RemoteConfigError;

/// Where the active snapshot came from after `fetch_and_activate`.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Served from a still-valid (or fallback) local snapshot.
    Cache,
    /// Served from a fresh remote fetch.
    Network,
    /// Remote had nothing and no local snapshot existed.
    Defaults,
    /// Remote fetch failed; the best available fallback was activated.
    Failure(RemoteConfigError),
}

impl FetchOutcome {
    pub fn tag(&self) -> &'static str {
        match self {
            FetchOutcome::Cache => "cache",
            FetchOutcome::Network => "network",
            FetchOutcome::Defaults => "defaults",
            FetchOutcome::Failure(_) => "failure",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FetchOutcome::Failure(_))
    }

    /// Underlying error of a `Failure`.
    pub fn cause(&self) -> Option<&RemoteConfigError> {
        match self {
            FetchOutcome::Failure(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchOutcome::Failure(e) => write!(f, "failure ({})", e),
            other => f.write_str(other.tag()),
        }
    }
}
