//! Cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use bgpq_core::constants::{DEFAULT_CACHE_TTL_SECONDS, MIN_CACHE_TTL_SECONDS};

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of every written record, in seconds
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        }
    }
}

impl CacheConfig {
    /// Creates a config with the given record lifetime, at least one second.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl_seconds: ttl.as_secs().max(MIN_CACHE_TTL_SECONDS),
        }
    }

    /// Record lifetime as a duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds.max(MIN_CACHE_TTL_SECONDS))
    }
}
