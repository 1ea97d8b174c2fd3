//! Capability traits the lookup cache is built on.
//!
//! The cache never talks to Redis or spawns processes directly; it goes
//! through these interfaces so tests can substitute in-memory fakes.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::types::{AddressFamily, Depth, PrefixList};

// ═══════════════════════════════════════════════════════════════════════════════
// KEY-VALUE STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// Remaining lifetime of a stored key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyTtl {
    /// The key does not exist.
    Absent,
    /// The key exists without an expiry.
    Persistent,
    /// The key expires after the given duration.
    Expires(Duration),
}

impl KeyTtl {
    /// Maps the Redis `TTL` reply (`-2` absent, `-1` no expiry, `n` seconds).
    pub fn from_seconds(ttl: i64) -> Self {
        match ttl {
            -1 => KeyTtl::Persistent,
            n if n >= 0 => KeyTtl::Expires(Duration::from_secs(n as u64)),
            _ => KeyTtl::Absent,
        }
    }

    /// Returns true if the key exists.
    pub fn is_present(&self) -> bool {
        !matches!(self, KeyTtl::Absent)
    }
}

/// Interface for the key-value store holding cached prefix lists.
///
/// Every method is a single atomic store round-trip.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetches the raw value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value, expiring after `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Deletes `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Returns the remaining lifetime of `key`.
    async fn ttl(&self, key: &str) -> Result<KeyTtl>;

    /// Lazily yields keys matching a glob `pattern`.
    ///
    /// Implementations may page internally; a key may be yielded more than
    /// once if the store is rehashed during the scan.
    fn scan(&self, pattern: &str) -> BoxStream<'static, Result<String>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// PREFIX RESOLVER
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for expanding an IRR object into prefixes.
#[async_trait]
pub trait PrefixResolver: Send + Sync {
    /// Expands `identifier` for one address family.
    ///
    /// Exactly one expansion per call: no caching, no retries.
    async fn resolve(&self, identifier: &str, family: AddressFamily, depth: Depth) -> Result<PrefixList>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_sentinels() {
        assert_eq!(KeyTtl::from_seconds(-2), KeyTtl::Absent);
        assert_eq!(KeyTtl::from_seconds(-1), KeyTtl::Persistent);
        assert_eq!(KeyTtl::from_seconds(0), KeyTtl::Expires(Duration::ZERO));
        assert_eq!(KeyTtl::from_seconds(30), KeyTtl::Expires(Duration::from_secs(30)));
        assert!(!KeyTtl::Absent.is_present());
        assert!(KeyTtl::Persistent.is_present());
    }
}
