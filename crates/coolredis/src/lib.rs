//! Redis cache plugin.
//!
//! The host hands the plugin its settings through [`host::PluginHost`];
//! [`plugin::install`] builds a [`handler::CacheHandler`] that connects to a
//! single Redis node or a cluster and proxies get/set/delete/keys to it.
//!
//! Pure logic (settings resolution, the connection state machine, status
//! values) lives in `coolredis_core` and is re-exported here.

pub mod config;
pub mod handler;
pub mod host;
pub mod plugin;
pub mod registry;
pub mod store;

pub use coolredis_core::cache::{Cache, CacheError, Connector, Result, Store};
pub use coolredis_core::config::{ConfigState, Endpoint, Topology};
pub use coolredis_core::status::PluginStatus;

pub use handler::CacheHandler;
#[cfg(feature = "redis")]
pub use handler::RedisCacheHandler;
pub use host::{PluginHost, StaticHost};
pub use plugin::install;
pub use registry::ConnectionRegistry;
