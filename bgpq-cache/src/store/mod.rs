//! Key-value store implementations.
//!
//! - [`RedisStore`]: production store
//! - [`MemoryStore`]: in-process store for development and tests

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::{RedisConfig, RedisStore};
