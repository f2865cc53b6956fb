/// Namespace the host stores this plugin's settings under.
pub const PLUGIN_NAMESPACE: &str = "redis";

/// Identifier used when pushing status changes to the host.
pub const PLUGIN_NAME: &str = "cool-redis";

/// Key written by the health probe to confirm write availability.
pub const SENTINEL_KEY: &str = "core:check:redis";

/// Value written under [`SENTINEL_KEY`].
pub const SENTINEL_VALUE: &[u8] = b"yes";

/// Pattern used by `keys` when the caller gives none.
pub const ALL_KEYS: &str = "*";
