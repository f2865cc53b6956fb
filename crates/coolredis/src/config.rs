use std::{env, time::Duration};

/// Handler tuning loaded from environment variables.
///
/// Connection settings are not part of this: they come from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Upper bound for establishing a connection (default: 5000 ms)
    pub connect_timeout_ms: u64,
    /// Upper bound for a single get/set/delete/keys call (default: 5000 ms)
    pub command_timeout_ms: u64,
    /// Upper bound for the sentinel write in `probe_status` (default: 2000 ms)
    pub probe_timeout_ms: u64,
    /// Maximum entries held by the in-memory backend (default: 10,000)
    pub memory_max_entries: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `COOLREDIS_CONNECT_TIMEOUT_MS` - connect timeout (default: 5000)
    /// - `COOLREDIS_COMMAND_TIMEOUT_MS` - per-command timeout (default: 5000)
    /// - `COOLREDIS_PROBE_TIMEOUT_MS` - health probe timeout (default: 2000)
    /// - `COOLREDIS_MEMORY_MAX_ENTRIES` - in-memory backend capacity (default: 10,000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::defaults();
        let parse = |name: &str| lookup(name).and_then(|v| v.trim().parse().ok());

        Self {
            connect_timeout_ms: parse("COOLREDIS_CONNECT_TIMEOUT_MS")
                .unwrap_or(defaults.connect_timeout_ms),
            command_timeout_ms: parse("COOLREDIS_COMMAND_TIMEOUT_MS")
                .unwrap_or(defaults.command_timeout_ms),
            probe_timeout_ms: parse("COOLREDIS_PROBE_TIMEOUT_MS")
                .unwrap_or(defaults.probe_timeout_ms),
            memory_max_entries: lookup("COOLREDIS_MEMORY_MAX_ENTRIES")
                .and_then(|v| v.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.memory_max_entries),
        }
    }

    /// Built-in values, ignoring the environment.
    pub fn defaults() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            command_timeout_ms: 5_000,
            probe_timeout_ms: 2_000,
            memory_max_entries: 10_000,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
