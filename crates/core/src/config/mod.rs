mod error;
mod resolve;
mod types;

pub use error::ConfigError;
pub use resolve::{resolve, resolve_state};
pub use types::{ConfigState, Endpoint, Topology};
