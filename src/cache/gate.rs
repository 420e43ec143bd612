//! TTL gate over the persisted snapshot.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Source of wall-clock time in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

/// Decides whether the last successful fetch is recent enough to trust the cache.
#[derive(Debug, Clone, Copy)]
pub struct CacheGate {
    ttl_hours: u64,
}

impl CacheGate {
    pub fn new(ttl_hours: u64) -> Self {
        Self { ttl_hours }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours.saturating_mul(3600))
    }

    /// `now - last_fetch <= ttl`, inclusive. A zero TTL, a missing mark,
    /// or a mark in the future is never fresh.
    pub fn is_fresh(&self, last_fetch_ms: Option<i64>, now_ms: i64) -> bool {
        if self.ttl_hours == 0 {
            return false;
        }
        let Some(last) = last_fetch_ms else {
            return false;
        };
        let elapsed = now_ms.saturating_sub(last);
        if elapsed < 0 {
            return false;
        }
        let ttl_ms = (self.ttl_hours as i64).saturating_mul(MILLIS_PER_HOUR);
        elapsed <= ttl_ms
    }
}
