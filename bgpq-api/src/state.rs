//! App state: lookup cache and config.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use bgpq_cache::{CacheConfig, LookupCache, MemoryStore, RedisConfig, RedisStore};
use bgpq_core::constants::{
    DEFAULT_BGPQ_PATH, DEFAULT_CACHE_TTL_SECONDS, DEFAULT_REDIS_DB, DEFAULT_REDIS_HOST, DEFAULT_REDIS_PORT,
    DEFAULT_RESOLVER_TIMEOUT_SECONDS,
};
use bgpq_core::error::Result;
use bgpq_core::traits::{KeyValueStore, PrefixResolver};
use bgpq_runner::{BgpqRunner, RunnerConfig};

/// Process-wide configuration.
#[derive(Clone, Debug, Default)]
pub struct ProxyConfig {
    /// bgpq binary and execution bound
    pub runner: RunnerConfig,
    /// Redis connection
    pub redis: RedisConfig,
    /// Record lifetime
    pub cache: CacheConfig,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(name, value = %raw, "Ignoring malformed environment variable");
            default
        }),
        Err(_) => default,
    }
}

impl ProxyConfig {
    /// Loads `.env` if present, then reads `BGPQ_PATH`, `BGPQ_TIMEOUT`,
    /// `REDIS_HOST`, `REDIS_PORT`, `REDIS_DB` and `CACHE_TIMEOUT`.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let runner = RunnerConfig {
            path: std::env::var("BGPQ_PATH")
                .unwrap_or_else(|_| DEFAULT_BGPQ_PATH.into())
                .into(),
            timeout_seconds: env_or("BGPQ_TIMEOUT", DEFAULT_RESOLVER_TIMEOUT_SECONDS),
        };

        let redis = RedisConfig {
            host: std::env::var("REDIS_HOST")
                .ok()
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REDIS_HOST.into()),
            port: env_or("REDIS_PORT", DEFAULT_REDIS_PORT),
            db: env_or("REDIS_DB", DEFAULT_REDIS_DB),
            ..Default::default()
        };

        let cache = CacheConfig::with_ttl(Duration::from_secs(env_or(
            "CACHE_TIMEOUT",
            DEFAULT_CACHE_TTL_SECONDS,
        )));

        Self { runner, redis, cache }
    }
}

/// Shared state of the API handlers.
pub struct AppState {
    /// Configuration the state was built from
    pub config: ProxyConfig,
    /// Prefix-list cache
    pub cache: LookupCache,
}

impl AppState {
    /// Connects to Redis and runs the configured bgpq binary.
    pub async fn connect(config: ProxyConfig) -> Result<Self> {
        let store = RedisStore::connect(&config.redis).await?;
        let runner = BgpqRunner::with_config(config.runner.clone());
        Ok(Self::with_components(config, Arc::new(store), Arc::new(runner)))
    }

    /// Keeps the cache in process memory instead of Redis.
    pub fn in_memory(config: ProxyConfig) -> Self {
        info!("Using in-memory store; cached entries are lost on restart");
        let runner = BgpqRunner::with_config(config.runner.clone());
        Self::with_components(config, Arc::new(MemoryStore::new()), Arc::new(runner))
    }

    /// Builds state over an explicit store and resolver.
    pub fn with_components(
        config: ProxyConfig,
        store: Arc<dyn KeyValueStore>,
        resolver: Arc<dyn PrefixResolver>,
    ) -> Self {
        let cache = LookupCache::new(store, resolver, config.cache.clone());
        Self { config, cache }
    }
}
