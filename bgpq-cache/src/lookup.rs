//! Read-through lookup cache.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::{self, try_join_all};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use bgpq_core::error::{ProxyError, Result};
use bgpq_core::traits::{KeyTtl, KeyValueStore, PrefixResolver};
use bgpq_core::types::{build_key, AddressFamily, Depth, FamilyPrefixes, LookupKey, ObjectKind, PrefixList};

use crate::config::CacheConfig;

/// Caller-controlled modifiers of one lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOptions {
    /// AS-SET expansion depth (0 = unbounded); ignored for AS lookups
    #[serde(default)]
    pub depth: Depth,
    /// Discard any cached entry before resolving
    #[serde(default)]
    pub invalidate: bool,
    /// Bypass the store entirely (no read, no write)
    #[serde(default)]
    pub no_cache: bool,
}

impl LookupOptions {
    /// Sets the expansion depth.
    pub fn with_depth(mut self, depth: Depth) -> Self {
        self.depth = depth;
        self
    }

    /// Discards the cached entry.
    pub fn invalidate(mut self) -> Self {
        self.invalidate = true;
        self
    }

    /// Bypasses the store.
    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }
}

/// Prefix-list cache in front of a resolver.
///
/// Flow of one lookup:
/// 1. Normalize and validate the identifier
/// 2. Build the store key
/// 3. Unless bypassed, check the store (invalidating if asked)
/// 4. On a miss, resolve
/// 5. Unless bypassed, write the fresh list back with the configured TTL
///
/// Concurrent misses on the same key may both resolve; the last write wins.
pub struct LookupCache {
    store: Arc<dyn KeyValueStore>,
    resolver: Arc<dyn PrefixResolver>,
    config: CacheConfig,
}

impl LookupCache {
    /// Creates a cache over `store` and `resolver`.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        resolver: Arc<dyn PrefixResolver>,
        config: CacheConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            config,
        }
    }

    /// Fetches the prefixes of one object for one address family.
    #[instrument(skip(self, options), fields(%kind, %family, depth = %options.depth))]
    pub async fn lookup(
        &self,
        kind: ObjectKind,
        raw_identifier: &str,
        family: AddressFamily,
        options: &LookupOptions,
    ) -> Result<PrefixList> {
        let identifier = kind.normalize(raw_identifier)?;
        let depth = match kind {
            ObjectKind::Asn => Depth::UNBOUNDED,
            ObjectKind::AsSet => options.depth,
        };
        let key = build_key(kind, &identifier, family, depth).to_string();

        if !options.no_cache {
            if let Some(prefixes) = self.fetch_from_cache(&key, options.invalidate).await? {
                debug!(key = %key, "Cache hit");
                return Ok(prefixes);
            }
            debug!(key = %key, "Cache miss, resolving");
        } else {
            debug!(key = %key, "Cache bypassed, resolving");
        }

        let prefixes = self.resolver.resolve(&identifier, family, depth).await?;

        if !options.no_cache {
            self.save_to_cache(&key, &prefixes).await?;
        }

        info!(key = %key, count = prefixes.len(), "Resolved prefixes");
        Ok(prefixes)
    }

    /// Fetches the prefixes of an AS.
    pub async fn lookup_asn(&self, asn: &str, family: AddressFamily, options: &LookupOptions) -> Result<PrefixList> {
        self.lookup(ObjectKind::Asn, asn, family, options).await
    }

    /// Fetches the prefixes of an AS-SET.
    pub async fn lookup_as_set(
        &self,
        as_set: &str,
        family: AddressFamily,
        options: &LookupOptions,
    ) -> Result<PrefixList> {
        self.lookup(ObjectKind::AsSet, as_set, family, options).await
    }

    /// Fetches the prefixes of one object for several address families concurrently.
    ///
    /// The identifier is validated once up front so that an invalid request
    /// touches neither the store nor the resolver.
    pub async fn lookup_families(
        &self,
        kind: ObjectKind,
        raw_identifier: &str,
        families: &[AddressFamily],
        options: &LookupOptions,
    ) -> Result<FamilyPrefixes> {
        kind.normalize(raw_identifier)?;

        let lists = try_join_all(
            families
                .iter()
                .map(|family| self.lookup(kind, raw_identifier, *family, options)),
        )
        .await?;

        let mut result = FamilyPrefixes::default();
        for (family, prefixes) in families.iter().zip(lists) {
            result.insert(*family, prefixes);
        }
        Ok(result)
    }

    /// Fetches both IPv4 and IPv6 prefixes of one object.
    pub async fn lookup_all(
        &self,
        kind: ObjectKind,
        raw_identifier: &str,
        options: &LookupOptions,
    ) -> Result<FamilyPrefixes> {
        self.lookup_families(kind, raw_identifier, &AddressFamily::ALL, options)
            .await
    }

    /// Lazily yields the distinct identifiers of `kind` currently cached.
    ///
    /// An identifier cached for several families or depths is yielded once.
    /// Keys that do not decompose are skipped with a warning.
    pub fn list_cached(&self, kind: ObjectKind) -> BoxStream<'static, Result<String>> {
        let mut seen = HashSet::new();

        self.store
            .scan(&kind.scan_pattern())
            .try_filter_map(move |raw_key| {
                let identifier = match LookupKey::parse(&raw_key) {
                    Some(key) if key.kind == kind => {
                        if seen.insert(key.identifier.clone()) {
                            Some(key.identifier)
                        } else {
                            None
                        }
                    }
                    _ => {
                        warn!(key = %raw_key, %kind, "Could not extract identifier from key");
                        None
                    }
                };
                future::ready(Ok(identifier))
            })
            .boxed()
    }

    /// Lazily yields the ASNs currently cached.
    pub fn list_cached_asns(&self) -> BoxStream<'static, Result<String>> {
        self.list_cached(ObjectKind::Asn)
    }

    /// Lazily yields the AS-SETs currently cached.
    pub fn list_cached_as_sets(&self) -> BoxStream<'static, Result<String>> {
        self.list_cached(ObjectKind::AsSet)
    }

    /// Returns the cached value for `key`, or `None` on a miss.
    async fn fetch_from_cache(&self, key: &str, invalidate: bool) -> Result<Option<PrefixList>> {
        let ttl = self.store.ttl(key).await?;
        if !ttl.is_present() {
            return Ok(None);
        }
        if ttl == KeyTtl::Persistent {
            warn!(key, "Key has no TTL and is possibly stale");
        }

        if invalidate {
            debug!(key, "Invalidating cached entry");
            self.store.delete(key).await?;
            return Ok(None);
        }

        // Records without expiry are never served; the write-back replaces them.
        if ttl == KeyTtl::Persistent {
            return Ok(None);
        }

        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_slice::<PrefixList>(&raw) {
            Ok(prefixes) => Ok(Some(prefixes)),
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cached value");
                Ok(None)
            }
        }
    }

    async fn save_to_cache(&self, key: &str, prefixes: &PrefixList) -> Result<()> {
        let value = serde_json::to_vec(prefixes).map_err(ProxyError::from)?;
        self.store.set(key, value, self.config.ttl()).await
    }
}
