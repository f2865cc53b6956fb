use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache is not configured")]
    ConfigMissing,
    #[error("Cache connection is not available")]
    ConnectionUnavailable,
    #[error("Cache connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Cache connection lost: {0}")]
    ConnectionLost(String),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
    #[error("Cache {0} timed out after {1:?}")]
    Timeout(&'static str, Duration),
}

impl CacheError {
    /// Returns true when the error says something about the link itself
    /// rather than about a single command.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::ConnectionLost(_) | Self::Timeout(..)
        )
    }

    /// Returns true when the backend gave up on the connection entirely.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::ConnectionLost(_))
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
