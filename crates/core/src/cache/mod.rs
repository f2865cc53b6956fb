mod error;
mod keys;
mod patterns;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{ALL_KEYS, PLUGIN_NAME, PLUGIN_NAMESPACE, SENTINEL_KEY, SENTINEL_VALUE};
pub use patterns::pattern_matches;
pub use traits::{Cache, Connector, Store};
