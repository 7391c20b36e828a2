use std::time::Duration;

/// Errors that can occur in the session store layer.
///
/// Every one of these fails the request that triggered it. The store is
/// the source of truth for "is this session current?", so an unreachable
/// store means "no" (fail closed), never "assume yes".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The operation did not complete within the configured bound.
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// The backend is unreachable or refused the connection.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A Redis command failed.
    #[cfg(feature = "redis")]
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}
