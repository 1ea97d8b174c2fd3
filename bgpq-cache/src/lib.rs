//! # bgpq-proxy Cache
//!
//! Read-through cache of prefix lists in front of a [`PrefixResolver`].
//!
//! - [`LookupCache`]: validates identifiers, checks the store, calls the
//!   resolver on a miss and writes the result back with a fixed TTL
//! - [`RedisStore`]: production key-value store
//! - [`MemoryStore`]: in-process store for development and tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use bgpq_cache::{CacheConfig, LookupCache, LookupOptions, MemoryStore};
//!
//! let cache = LookupCache::new(Arc::new(MemoryStore::new()), Arc::new(runner), CacheConfig::default());
//! let prefixes = cache.lookup_asn("64496", AddressFamily::Ipv4, &LookupOptions::default()).await?;
//! ```
//!
//! [`PrefixResolver`]: bgpq_core::PrefixResolver

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
mod lookup;
pub mod store;

pub use config::CacheConfig;
pub use lookup::{LookupCache, LookupOptions};
pub use store::{MemoryStore, RedisConfig, RedisStore};
