use std::time::Duration;

use async_trait::async_trait;

use crate::config::Topology;

use super::Result;

/// Cache surface handed to plugin consumers.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Lists key names matching a glob pattern (all keys when `None`).
    async fn keys(&self, pattern: Option<&str>) -> Result<Vec<String>>;

    /// Identifies the backing store kind.
    fn mode(&self) -> &'static str;
}

/// A live connection to a key-value backend.
///
/// Implementations must be safe to call from many tasks at once; the
/// handler never serializes commands itself.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes a value, applying the expiry in the same command when given.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;
}

/// Creates [`Store`] connections for a resolved topology.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Store: Store;

    /// Opens a connection. Fails with a connection-class error when the
    /// backend cannot be reached or the topology is unusable.
    async fn connect(&self, topology: &Topology) -> Result<Self::Store>;

    /// Identifies the backing store kind.
    fn mode(&self) -> &'static str;
}
