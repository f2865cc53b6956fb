use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;
use tokio::time::Instant;

use coolredis_core::cache::{pattern_matches, CacheError, Connector, Result, Store};
use coolredis_core::config::Topology;

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// In-memory store with LRU eviction and lazy TTL expiry.
///
/// Expiry follows tokio's clock, so tests can drive it with a paused
/// runtime. Clones share the same entries.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<LruCache<String, CacheEntry>>>,
}

impl MemoryStore {
    /// Creates a store holding at most `max_entries` keys.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is 0.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).expect("max_entries must be > 0");
        Self {
            entries: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Number of live (unexpired) keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.iter().filter(|(_, e)| !e.is_expired(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.write().await;

        match entries.get(key) {
            Some(entry) if entry.is_expired(Instant::now()) => {
                entries.pop(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.put(key.to_string(), CacheEntry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.pop(key);
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let now = Instant::now();
        let entries = self.entries.read().await;

        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired(now) && pattern_matches(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();

        Ok(keys)
    }
}

/// Hands out connections to one shared [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    server: MemoryStore,
}

impl MemoryConnector {
    pub fn new(max_entries: usize) -> Self {
        Self {
            server: MemoryStore::new(max_entries),
        }
    }

    /// The store every connection points at.
    pub fn server(&self) -> &MemoryStore {
        &self.server
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Store = MemoryStore;

    async fn connect(&self, topology: &Topology) -> Result<MemoryStore> {
        if topology.endpoints().is_empty() {
            return Err(CacheError::ConnectionFailed(
                "no cluster nodes configured".to_string(),
            ));
        }
        Ok(self.server.clone())
    }

    fn mode(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coolredis_core::config::Endpoint;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new(100);

        store.set("key1", b"value1", None).await.unwrap();

        let result = store.get("key1").await.unwrap();
        assert_eq!(result, Some(b"value1".to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let store = MemoryStore::new(100);
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new(100);

        store.set("key1", b"value1", None).await.unwrap();
        store.delete("key1").await.unwrap();

        assert_eq!(store.get("key1").await.unwrap(), None);
        // Deleting again is not an error
        store.delete("key1").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiration() {
        let store = MemoryStore::new(100);

        store
            .set("expiring", b"value", Some(Duration::from_secs(2)))
            .await
            .unwrap();
        assert!(store.get("expiring").await.unwrap().is_some());

        tokio::time::advance(Duration::from_millis(1_999)).await;
        assert!(store.get("expiring").await.unwrap().is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(store.get("expiring").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_clears_ttl() {
        let store = MemoryStore::new(100);

        store
            .set("key", b"short", Some(Duration::from_secs(1)))
            .await
            .unwrap();
        store.set("key", b"forever", None).await.unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(store.get("key").await.unwrap(), Some(b"forever".to_vec()));
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let store = MemoryStore::new(2);

        store.set("a", b"1", None).await.unwrap();
        store.set("b", b"2", None).await.unwrap();
        // Touch "a" so "b" becomes least recently used
        store.get("a").await.unwrap();
        store.set("c", b"3", None).await.unwrap();

        assert!(store.get("a").await.unwrap().is_some());
        assert!(store.get("b").await.unwrap().is_none());
        assert!(store.get("c").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_filters_pattern_and_expired() {
        let store = MemoryStore::new(100);

        store.set("session:2", b"x", None).await.unwrap();
        store.set("session:1", b"x", None).await.unwrap();
        store.set("user:1", b"x", None).await.unwrap();
        store
            .set("session:3", b"x", Some(Duration::from_secs(1)))
            .await
            .unwrap();

        assert_eq!(
            store.keys("session:*").await.unwrap(),
            vec!["session:1", "session:2", "session:3"]
        );

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(
            store.keys("session:*").await.unwrap(),
            vec!["session:1", "session:2"]
        );
        assert_eq!(store.keys("*").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_connections_share_one_server() {
        let connector = MemoryConnector::new(100);
        let topology = Topology::Single(Endpoint::default());

        let first = connector.connect(&topology).await.unwrap();
        let second = connector.connect(&topology).await.unwrap();

        first.set("shared", b"yes", None).await.unwrap();
        assert_eq!(second.get("shared").await.unwrap(), Some(b"yes".to_vec()));
        assert_eq!(connector.server().len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_cluster_fails_to_connect() {
        let connector = MemoryConnector::new(100);
        let err = connector
            .connect(&Topology::Cluster(vec![]))
            .await
            .unwrap_err();
        assert!(err.is_connection_error());
    }

    #[tokio::test]
    async fn test_cluster_with_nodes_connects() {
        let connector = MemoryConnector::new(100);
        let topology = Topology::Cluster(vec![
            Endpoint::new("10.0.0.1", 7000),
            Endpoint::new("10.0.0.2", 7001),
        ]);
        assert!(connector.connect(&topology).await.is_ok());
        assert_eq!(connector.mode(), "memory");
    }
}
