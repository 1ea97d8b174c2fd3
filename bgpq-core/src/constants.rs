//! Defaults and fixed strings for bgpq-proxy.

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLVER
// ═══════════════════════════════════════════════════════════════════════════════

/// Default location of the bgpq3/bgpq4 binary.
pub const DEFAULT_BGPQ_PATH: &str = "/usr/local/bin/bgpq3";

/// Default upper bound on a single resolver execution, in seconds.
pub const DEFAULT_RESOLVER_TIMEOUT_SECONDS: u64 = 60;

/// Name of the JSON array the resolver is asked to emit (`-l prefixes`).
pub const PREFIX_LIST_NAME: &str = "prefixes";

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Default lifetime of a cached prefix list, in seconds (one day).
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 86_400;

/// Shortest record lifetime a store accepts; shorter TTLs are raised to it.
pub const MIN_CACHE_TTL_SECONDS: u64 = 1;

/// Default page size hint for store key scans.
pub const DEFAULT_SCAN_COUNT: usize = 10;

/// Key prefix for AS lookups.
pub const ASN_KEY_PREFIX: &str = "asn";

/// Key prefix for AS-SET lookups.
pub const AS_SET_KEY_PREFIX: &str = "as_set";

// ═══════════════════════════════════════════════════════════════════════════════
// STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// Default Redis host.
pub const DEFAULT_REDIS_HOST: &str = "localhost";

/// Default Redis port.
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Default Redis logical database.
pub const DEFAULT_REDIS_DB: i64 = 0;
