//! Host-facing install entry point.

use std::sync::Arc;

use coolredis_core::cache::Connector;

use crate::config::Config;
use crate::handler::CacheHandler;
use crate::host::PluginHost;
use crate::registry::ConnectionRegistry;

/// Builds the cache handler and runs its first initialization.
///
/// Always returns the handler, even when the store is unreachable: the
/// status pushed to the host says whether it can be used, and `set`
/// retries the connection later.
pub async fn install<C: Connector>(
    host: Arc<dyn PluginHost>,
    connector: C,
    registry: ConnectionRegistry<C::Store>,
    config: Config,
) -> Arc<CacheHandler<C>> {
    let handler = Arc::new(CacheHandler::new(host, connector, registry, config));
    let status = handler.init().await;

    tracing::info!(mode = handler.mode(), %status, "cool redis component ready");

    handler
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use coolredis_core::status::PluginStatus;
    use serde_json::json;

    use crate::host::StaticHost;
    use crate::store::MemoryConnector;

    #[tokio::test]
    async fn test_install_pushes_usable_status() {
        let host = Arc::new(StaticHost::new(Some(json!({"host": "localhost"}))));
        let mut statuses = host.subscribe();

        let handler = install(
            host.clone(),
            MemoryConnector::new(16),
            ConnectionRegistry::new(),
            Config::defaults(),
        )
        .await;

        assert!(statuses.has_changed().unwrap());
        assert_eq!(*statuses.borrow_and_update(), Some(PluginStatus::Usable));
        assert_eq!(handler.mode(), "memory");
        assert!(handler.raw_handle().await.is_some());
    }

    #[tokio::test]
    async fn test_install_without_settings_still_returns_handler() {
        let host = Arc::new(StaticHost::new(None));
        let connector = MemoryConnector::new(16);

        let handler = install(
            host.clone(),
            connector.clone(),
            ConnectionRegistry::new(),
            Config::defaults(),
        )
        .await;

        assert_eq!(host.last_status(), None);
        assert_eq!(handler.probe_status().await, PluginStatus::NoConfig);
        assert!(connector.server().is_empty().await);
    }
}
