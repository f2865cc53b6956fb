//! In-memory store with LRU eviction.
//!
//! Behaves like a single Redis server shared by every connection the
//! connector hands out, which keeps handler tests free of a real server.

mod store;

pub use store::{MemoryConnector, MemoryStore};
