//! Collaborators provided by the host application.
//!
//! The plugin does not know how the host stores settings or surfaces plugin
//! health; it only needs the two calls on [`PluginHost`].

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use coolredis_core::status::PluginStatus;

/// Host-side plugin services.
#[async_trait]
pub trait PluginHost: Send + Sync {
    /// Returns the resolved settings stored under `namespace`, if any.
    async fn config(&self, namespace: &str) -> Option<Value>;

    /// Records a status change pushed by the plugin named `plugin`.
    fn change_status(&self, plugin: &str, status: PluginStatus);
}

/// In-process host with fixed settings.
///
/// Statuses pushed by the plugin are published on a watch channel, so
/// callers can read the latest one or wait for the next change.
pub struct StaticHost {
    config: Option<Value>,
    status_tx: watch::Sender<Option<PluginStatus>>,
}

impl StaticHost {
    pub fn new(config: Option<Value>) -> Self {
        let (status_tx, _) = watch::channel(None);
        Self { config, status_tx }
    }

    /// Latest status pushed by the plugin, if it pushed any.
    pub fn last_status(&self) -> Option<PluginStatus> {
        *self.status_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PluginStatus>> {
        self.status_tx.subscribe()
    }
}

#[async_trait]
impl PluginHost for StaticHost {
    async fn config(&self, _namespace: &str) -> Option<Value> {
        self.config.clone()
    }

    fn change_status(&self, plugin: &str, status: PluginStatus) {
        tracing::debug!(plugin, %status, "plugin status changed");
        self.status_tx.send_replace(Some(status));
    }
}
