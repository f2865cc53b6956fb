use serde::{Deserialize, Serialize};
use urlencoding::encode;

use super::ConfigError;

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    6379
}

/// A single Redis node.
///
/// Unknown fields are ignored so host configs written for other clients
/// still resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, alias = "user")]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub db: i64,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: None,
            password: None,
            db: 0,
        }
    }
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Checks the fields a connection cannot work without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidEndpoint(
                "host cannot be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidEndpoint(format!(
                "port 0 is not valid for host {}",
                self.host
            )));
        }
        if self.db < 0 {
            return Err(ConfigError::InvalidEndpoint(format!(
                "db index {} is negative",
                self.db
            )));
        }
        Ok(())
    }

    /// Renders the endpoint as a `redis://` URL.
    ///
    /// Credentials are percent-encoded and IPv6 hosts are bracketed.
    ///
    /// # Examples
    ///
    /// ```
    /// use coolredis_core::config::Endpoint;
    ///
    /// let mut endpoint = Endpoint::new("cache.internal", 6380);
    /// endpoint.password = Some("p@ss".to_string());
    /// endpoint.db = 2;
    /// assert_eq!(endpoint.connection_url(), "redis://:p%40ss@cache.internal:6380/2");
    /// ```
    pub fn connection_url(&self) -> String {
        let auth = match (&self.username, &self.password) {
            (Some(user), Some(pass)) => format!("{}:{}@", encode(user), encode(pass)),
            (None, Some(pass)) => format!(":{}@", encode(pass)),
            (Some(user), None) => format!("{}@", encode(user)),
            (None, None) => String::new(),
        };

        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };

        format!("redis://{}{}:{}/{}", auth, host, self.port, self.db)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.port, self.db)
    }
}

/// Deployment shape, decided once when settings are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topology {
    Single(Endpoint),
    /// Seed nodes of a cluster, in the order they were configured.
    Cluster(Vec<Endpoint>),
}

impl Topology {
    pub fn is_cluster(&self) -> bool {
        matches!(self, Self::Cluster(_))
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        match self {
            Self::Single(endpoint) => std::slice::from_ref(endpoint),
            Self::Cluster(nodes) => nodes,
        }
    }

    pub fn kind(&self) -> &'static str {
        if self.is_cluster() {
            "cluster"
        } else {
            "single"
        }
    }
}

/// What the handler knows about its settings after the last resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigState {
    #[default]
    Missing,
    /// Settings were supplied but could not be used.
    Invalid(ConfigError),
    Resolved(Topology),
}

impl ConfigState {
    pub fn topology(&self) -> Option<&Topology> {
        match self {
            Self::Resolved(topology) => Some(topology),
            _ => None,
        }
    }
}
