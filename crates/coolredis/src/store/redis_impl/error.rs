//! Redis error mapping to CacheError.

use coolredis_core::cache::CacheError;

/// Maps Redis errors to CacheError.
///
/// Link failures the client recovers from on its own (refused, reset,
/// dropped, timed out) are `ConnectionFailed`, which keeps the handle.
/// Only errors left that still demand a fresh connection, such as a
/// corrupted reply stream, become `ConnectionLost`. Everything else is a
/// command failure.
pub fn map_redis_error(err: redis::RedisError) -> CacheError {
    if err.is_connection_refusal()
        || err.is_timeout()
        || err.is_connection_dropped()
        || err.is_io_error()
    {
        CacheError::ConnectionFailed(err.to_string())
    } else if err.is_unrecoverable_error() {
        CacheError::ConnectionLost(err.to_string())
    } else {
        CacheError::OperationFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redis::{ErrorKind, RedisError};

    #[test]
    fn test_command_errors_map_to_operation_failed() {
        let err = RedisError::from((ErrorKind::TypeError, "wrong type"));
        assert!(matches!(
            map_redis_error(err),
            CacheError::OperationFailed(_)
        ));
    }

    #[test]
    fn test_network_errors_keep_the_connection() {
        use std::io::{Error, ErrorKind as IoKind};

        for kind in [
            IoKind::ConnectionReset,
            IoKind::BrokenPipe,
            IoKind::ConnectionRefused,
            IoKind::ConnectionAborted,
            IoKind::UnexpectedEof,
        ] {
            let mapped = map_redis_error(RedisError::from(Error::new(kind, "x")));
            assert!(
                matches!(mapped, CacheError::ConnectionFailed(_)),
                "{kind:?} mapped to {mapped:?}"
            );
            assert!(mapped.is_connection_error());
            assert!(!mapped.is_unrecoverable(), "{kind:?} dropped the handle");
        }
    }
}
