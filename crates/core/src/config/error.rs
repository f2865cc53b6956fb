use thiserror::Error;

/// Errors that can occur while resolving connection settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration is not valid JSON: {0}")]
    Parse(String),
    #[error("Configuration must be an object or an array, got {0}")]
    UnsupportedShape(&'static str),
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}
