//! Redis store backend.
//!
//! Single-node deployments use a `ConnectionManager`, clusters a
//! `ClusterConnection`. Both are multiplexed: clones share one underlying
//! link and pipeline concurrent commands, so the handler never has to
//! serialize callers.

mod error;
mod store;

pub use error::map_redis_error;
pub use store::{RedisConnector, RedisStore};
