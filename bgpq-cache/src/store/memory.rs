//! In-memory key-value store with per-key expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::RwLock;

use bgpq_core::constants::MIN_CACHE_TTL_SECONDS;
use bgpq_core::error::Result;
use bgpq_core::traits::{KeyTtl, KeyValueStore};

/// Stored value with optional TTL.
#[derive(Clone)]
struct StoreEntry {
    value: Vec<u8>,
    inserted_at: Instant,
    ttl: Option<Duration>,
}

impl StoreEntry {
    fn is_expired(&self) -> bool {
        self.ttl.map(|ttl| self.inserted_at.elapsed() >= ttl).unwrap_or(false)
    }

    fn remaining(&self) -> KeyTtl {
        match self.ttl {
            Some(ttl) => KeyTtl::Expires(ttl.saturating_sub(self.inserted_at.elapsed())),
            None => KeyTtl::Persistent,
        }
    }
}

/// In-memory store.
///
/// Thread-safe; expired entries are invisible to readers and purged lazily
/// on write or by [`MemoryStore::cleanup_expired`]. Like Redis `EX`, a TTL
/// below one second is raised to one second.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoreEntry>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value without expiry.
    ///
    /// The lookup cache never does this; it exists to reproduce records
    /// written by hand.
    pub fn insert_persistent(&self, key: &str, value: Vec<u8>) {
        self.entries.write().insert(
            key.to_string(),
            StoreEntry {
                value,
                inserted_at: Instant::now(),
                ttl: None,
            },
        );
    }

    /// Removes all expired entries.
    pub fn cleanup_expired(&self) {
        self.entries.write().retain(|_, e| !e.is_expired());
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.entries.read().values().filter(|e| !e.is_expired()).count()
    }

    /// Returns true if no live entry exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if a live entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().get(key).map(|e| !e.is_expired()).unwrap_or(false)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read();
        Ok(entries
            .get(key)
            .filter(|e| !e.is_expired())
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write();
        entries.retain(|_, e| !e.is_expired());
        entries.insert(
            key.to_string(),
            StoreEntry {
                value,
                inserted_at: Instant::now(),
                ttl: Some(ttl.max(Duration::from_secs(MIN_CACHE_TTL_SECONDS))),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let entries = self.entries.read();
        Ok(match entries.get(key) {
            Some(e) if !e.is_expired() => e.remaining(),
            _ => KeyTtl::Absent,
        })
    }

    fn scan(&self, pattern: &str) -> BoxStream<'static, Result<String>> {
        let keys: Vec<String> = self
            .entries
            .read()
            .iter()
            .filter(|(k, e)| !e.is_expired() && glob_match(pattern, k))
            .map(|(k, _)| k.clone())
            .collect();

        stream::iter(keys.into_iter().map(Ok)).boxed()
    }
}

/// Matches `text` against a glob supporting `*` and `?`.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = backtrack {
            p = star_p + 1;
            t = star_t + 1;
            backtrack = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
