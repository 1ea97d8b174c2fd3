//! # bgpq-proxy Core
//!
//! Core types, errors, and traits shared by every bgpq-proxy crate.
//!
//! - **Types**: identifiers, address families, depths, and cache keys
//! - **Errors**: the [`ProxyError`] taxonomy surfaced to callers
//! - **Constants**: defaults for the resolver, the store, and the cache
//! - **Traits**: the store and resolver capabilities the lookup cache is built on
//!
//! ## Example
//!
//! ```rust
//! use bgpq_core::{build_key, normalize_as_set, AddressFamily, Depth, ObjectKind};
//!
//! let as_set = normalize_as_set("as-example").unwrap();
//! let key = build_key(ObjectKind::AsSet, as_set.as_str(), AddressFamily::Ipv6, Depth::new(2));
//! assert_eq!(key.to_string(), "as_set:AS-EXAMPLE:ipv6:2");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{ProxyError, Result};
pub use traits::*;
pub use types::*;
