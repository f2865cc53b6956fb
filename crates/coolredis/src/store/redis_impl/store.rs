use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use redis::{Cmd, FromRedisValue};

use coolredis_core::cache::{Connector, Result, Store};
use coolredis_core::config::Topology;

use super::error::map_redis_error;

/// A live Redis connection, single-node or cluster.
///
/// This is what `raw_handle` exposes: callers needing commands the cache
/// surface does not wrap (TTL inspection, pub/sub, scripting) can clone the
/// inner connection and talk to Redis directly.
#[derive(Clone)]
pub enum RedisStore {
    Single(ConnectionManager),
    Cluster(ClusterConnection),
}

impl RedisStore {
    /// Runs a command on whichever connection this is.
    pub async fn query<T: FromRedisValue>(&self, cmd: &Cmd) -> redis::RedisResult<T> {
        match self {
            Self::Single(conn) => {
                let mut conn = conn.clone();
                cmd.query_async(&mut conn).await
            }
            Self::Cluster(conn) => {
                let mut conn = conn.clone();
                cmd.query_async(&mut conn).await
            }
        }
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.query(redis::cmd("GET").arg(key))
            .await
            .map_err(map_redis_error)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(duration) = ttl {
            cmd.arg("EX").arg(duration.as_secs().max(1));
        }

        self.query::<()>(&cmd).await.map_err(map_redis_error)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.query::<()>(redis::cmd("DEL").arg(key))
            .await
            .map_err(map_redis_error)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        // Cluster routing fans KEYS out to every primary and merges the replies.
        self.query(redis::cmd("KEYS").arg(pattern))
            .await
            .map_err(map_redis_error)
    }
}

/// Opens Redis connections for a resolved topology.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisConnector;

impl RedisConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for RedisConnector {
    type Store = RedisStore;

    async fn connect(&self, topology: &Topology) -> Result<RedisStore> {
        match topology {
            Topology::Single(endpoint) => {
                tracing::debug!(%endpoint, "opening redis connection");
                let client =
                    redis::Client::open(endpoint.connection_url()).map_err(map_redis_error)?;
                let conn = ConnectionManager::new(client)
                    .await
                    .map_err(map_redis_error)?;
                Ok(RedisStore::Single(conn))
            }
            Topology::Cluster(nodes) => {
                tracing::debug!(nodes = nodes.len(), "opening redis cluster connection");
                let urls: Vec<String> = nodes.iter().map(|n| n.connection_url()).collect();
                let client = ClusterClient::new(urls).map_err(map_redis_error)?;
                let conn = client
                    .get_async_connection()
                    .await
                    .map_err(map_redis_error)?;
                Ok(RedisStore::Cluster(conn))
            }
        }
    }

    fn mode(&self) -> &'static str {
        "redis"
    }
}
