//! The cache handler the host installs.
//!
//! Owns nothing but settings: the connection lives in a
//! [`ConnectionRegistry`] so every handler in the process shares it.
//! Initialization never fails loudly. Resolution and connection problems
//! become a [`PluginStatus`], while individual cache operations return
//! errors to their callers.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use coolredis_core::cache::{
    Cache, CacheError, Connector, Result, Store, ALL_KEYS, PLUGIN_NAME, PLUGIN_NAMESPACE,
    SENTINEL_KEY, SENTINEL_VALUE,
};
use coolredis_core::config::{resolve_state, ConfigState, Topology};
use coolredis_core::connection::{LinkEvent, Transition};
use coolredis_core::status::PluginStatus;

use crate::config::Config;
use crate::host::PluginHost;
use crate::registry::ConnectionRegistry;

/// Cache handler over a lazily created, shared connection.
pub struct CacheHandler<C: Connector> {
    host: Arc<dyn PluginHost>,
    connector: C,
    registry: ConnectionRegistry<C::Store>,
    config: Config,
    settings: RwLock<ConfigState>,
}

impl<C: Connector> CacheHandler<C> {
    pub fn new(
        host: Arc<dyn PluginHost>,
        connector: C,
        registry: ConnectionRegistry<C::Store>,
        config: Config,
    ) -> Self {
        Self {
            host,
            connector,
            registry,
            config,
            settings: RwLock::new(ConfigState::Missing),
        }
    }

    /// Pulls settings from the host and initializes with them.
    pub async fn init(&self) -> PluginStatus {
        let resolved = self.host.config(PLUGIN_NAMESPACE).await;
        self.initialize(resolved.as_ref()).await
    }

    /// Resolves `resolved` into a topology, connects if needed and probes.
    ///
    /// A connection already held by the registry is reused. Concurrent
    /// calls are serialized, so they never open more than one connection.
    ///
    /// Settings that do not resolve leave a registered connection alone:
    /// `probe_status` reports [`PluginStatus::UnknownError`], yet commands
    /// keep running on that connection and `set` does not re-initialize
    /// while it exists. Call [`shutdown`](Self::shutdown) first to drop it.
    pub async fn initialize(&self, resolved: Option<&Value>) -> PluginStatus {
        let state = resolve_state(resolved);
        match &state {
            ConfigState::Missing => tracing::debug!("no redis settings supplied"),
            ConfigState::Invalid(e) => {
                tracing::warn!(error = %e, "ignoring unusable redis settings")
            }
            ConfigState::Resolved(topology) => tracing::debug!(
                topology = topology.kind(),
                nodes = topology.endpoints().len(),
                "resolved redis settings"
            ),
        }

        let topology = state.topology().cloned();
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = state;

        if let Some(topology) = topology {
            self.connect(&topology).await;
        }

        self.probe_status().await
    }

    async fn connect(&self, topology: &Topology) {
        let mut slot = self.registry.lock().await;
        if slot.store.is_some() {
            tracing::debug!("reusing registered redis connection");
            return;
        }

        let limit = self.config.connect_timeout();
        match bounded("connect", limit, self.connector.connect(topology)).await {
            Ok(store) => {
                slot.store = Some(Arc::new(store));
                let transition = slot.apply(LinkEvent::Connect);
                self.act(transition, None);
            }
            Err(e) => {
                let transition = slot.apply(LinkEvent::Error);
                self.act(transition, Some(&e));
            }
        }
    }

    /// Reports whether the cache is usable right now.
    ///
    /// Writes [`SENTINEL_KEY`] as a side effect. Never fails: every error
    /// turns into [`PluginStatus::UnknownError`].
    pub async fn probe_status(&self) -> PluginStatus {
        match self.settings() {
            ConfigState::Missing => return PluginStatus::NoConfig,
            ConfigState::Invalid(_) => return PluginStatus::UnknownError,
            ConfigState::Resolved(_) => {}
        }

        let Some(store) = self.registry.current().await else {
            return PluginStatus::UnknownError;
        };

        let limit = self.config.probe_timeout();
        let result = bounded("probe", limit, store.set(SENTINEL_KEY, SENTINEL_VALUE, None)).await;
        match self.observe(&store, result).await {
            Ok(()) => PluginStatus::Usable,
            Err(e) => {
                tracing::debug!(error = %e, "redis health probe failed");
                PluginStatus::UnknownError
            }
        }
    }

    /// Gets a value. Does not initialize a missing connection.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let store = self.store().await?;
        let result = bounded("get", self.config.command_timeout(), store.get(key)).await;
        self.observe(&store, result).await
    }

    /// Sets a value, initializing the connection first if there is none.
    ///
    /// Fails with [`CacheError::ConfigMissing`] when the host has no
    /// settings. The expiry is written in the same command as the value.
    /// A zero `ttl` means no expiry; sub-second values round up to one
    /// second.
    pub async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        if self.registry.current().await.is_none()
            && self.init().await == PluginStatus::NoConfig
        {
            return Err(CacheError::ConfigMissing);
        }

        let store = self.store().await?;
        let ttl = ttl.and_then(whole_seconds);
        let result = bounded("set", self.config.command_timeout(), store.set(key, value, ttl)).await;
        self.observe(&store, result).await
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let store = self.store().await?;
        let result = bounded("delete", self.config.command_timeout(), store.delete(key)).await;
        self.observe(&store, result).await
    }

    /// Lists keys matching `pattern`, or every key when `None`.
    pub async fn keys(&self, pattern: Option<&str>) -> Result<Vec<String>> {
        let store = self.store().await?;
        let pattern = pattern.unwrap_or(ALL_KEYS);
        let result = bounded("keys", self.config.command_timeout(), store.keys(pattern)).await;
        self.observe(&store, result).await
    }

    pub fn mode(&self) -> &'static str {
        self.connector.mode()
    }

    /// The backend connection itself.
    ///
    /// This bypasses the handler: nothing done through it is timed out or
    /// tracked for status. Meant for features the cache surface does not
    /// wrap.
    pub async fn raw_handle(&self) -> Option<Arc<C::Store>> {
        self.registry.current().await
    }

    /// Settings as of the last initialization.
    pub fn settings(&self) -> ConfigState {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Host stop hook: releases the shared connection.
    pub async fn shutdown(&self) {
        let mut slot = self.registry.lock().await;
        if slot.store.is_none() {
            return;
        }
        let transition = slot.apply(LinkEvent::End);
        self.act(transition, None);
        tracing::info!(mode = self.mode(), "redis connection closed");
    }

    async fn store(&self) -> Result<Arc<C::Store>> {
        self.registry
            .current()
            .await
            .ok_or(CacheError::ConnectionUnavailable)
    }

    /// Feeds the outcome of a command on `store` into the state machine.
    async fn observe<T>(&self, store: &Arc<C::Store>, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) if self.registry.is_degraded() => {
                let mut slot = self.registry.lock().await;
                if slot.link.is_degraded() {
                    if let Some(transition) = slot.apply_for(store, LinkEvent::Connect) {
                        self.act(transition, None);
                    }
                }
            }
            Err(e) if e.is_connection_error() => {
                let mut slot = self.registry.lock().await;
                if let Some(transition) = slot.apply_for(store, LinkEvent::Error) {
                    self.act(transition, Some(e));
                }
                if e.is_unrecoverable() {
                    if let Some(transition) = slot.apply_for(store, LinkEvent::End) {
                        self.act(transition, Some(e));
                    }
                }
            }
            _ => {}
        }
        result
    }

    fn act(&self, transition: Transition, error: Option<&CacheError>) {
        if transition.report_error {
            match error {
                Some(e) => tracing::error!(mode = self.mode(), error = %e, "redis connection error"),
                None => tracing::error!(mode = self.mode(), "redis connection error"),
            }
        }
        if transition.announce_connect {
            tracing::info!(mode = self.mode(), "redis connected");
        }
        if let Some(status) = transition.status {
            self.host.change_status(PLUGIN_NAME, status);
        }
    }
}

#[async_trait]
impl<C: Connector> Cache for CacheHandler<C> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        CacheHandler::get(self, key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        CacheHandler::set(self, key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        CacheHandler::delete(self, key).await
    }

    async fn keys(&self, pattern: Option<&str>) -> Result<Vec<String>> {
        CacheHandler::keys(self, pattern).await
    }

    fn mode(&self) -> &'static str {
        CacheHandler::mode(self)
    }
}

async fn bounded<T>(
    op: &'static str,
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or(Err(CacheError::Timeout(op, limit)))
}

/// Rounds a TTL up to whole seconds; zero means no expiry.
fn whole_seconds(ttl: Duration) -> Option<Duration> {
    if ttl.is_zero() {
        return None;
    }
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    Some(Duration::from_secs(secs))
}

#[cfg(feature = "redis")]
pub type RedisCacheHandler = CacheHandler<crate::store::RedisConnector>;
