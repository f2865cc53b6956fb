//! Coarse plugin health reported to the host.

use serde::{Deserialize, Serialize};

/// Usability of the cache as seen by health checks.
///
/// The value is derived from probes and connection events; it is never the
/// source of truth for whether a connection exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PluginStatus {
    /// No settings were supplied.
    NoConfig,
    /// The sentinel write went through.
    Usable,
    /// Settings exist but the store cannot be used right now.
    UnknownError,
}

impl PluginStatus {
    pub fn is_usable(self) -> bool {
        self == Self::Usable
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoConfig => "NO_CONFIG",
            Self::Usable => "USABLE",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl std::fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
