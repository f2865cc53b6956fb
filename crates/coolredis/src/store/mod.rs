//! Backend implementations of [`coolredis_core::cache::Store`].
//!
//! # Feature Flags
//!
//! - `redis` (default): single-node and cluster Redis via the redis crate
//! - `memory` (default): in-process LRU store for tests and local development
//!
//! Unlike most backend flags, these can be enabled together.

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

#[cfg(feature = "memory")]
pub use memory::{MemoryConnector, MemoryStore};

#[cfg(feature = "redis")]
pub use redis_impl::{RedisConnector, RedisStore};
