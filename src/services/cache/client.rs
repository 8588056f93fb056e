//! Cache client interface used by the secret service.
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors.
///
/// Errors from the redis/memcache clients and join errors never leave the adapter;
/// they are flattened into `Unavailable` or `Timeout`, which callers surface as a
/// 5xx. `InvalidValue` means the backend cannot hold the value as given.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("{backend} unavailable: {reason}")]
    Unavailable {
        backend: &'static str,
        reason: String,
    },
    #[error("{backend} did not answer within {timeout:?}")]
    Timeout {
        backend: &'static str,
        timeout: Duration,
    },
    #[error("cache value error: {0}")]
    InvalidValue(String),
}

impl CacheError {
    pub fn unavailable(backend: &'static str, reason: impl ToString) -> Self {
        Self::Unavailable {
            backend,
            reason: reason.to_string(),
        }
    }
}

/// A minimal expiring key/value store.
///
/// String based on purpose: secrets are UTF-8 text and every backend can hold them.
///
/// Expiry is checked at access time. A key whose TTL has elapsed is absent for
/// every read, whether or not a background sweep has reclaimed it yet.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside)
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the cache backend name (for logging/health).
    fn backend_name(&self) -> &'static str;

    // Insert or overwrite `key`, expiring after `ttl`.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    // Get UTF-8 string value without consuming it.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Atomically read and remove `key`.
    //
    // Of any number of concurrent callers for the same key, at most one gets `Some`.
    async fn take_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Delete a key. Returns whether a key was removed.
    async fn del(&self, key: &str) -> CacheResult<bool>;
}

/// Bound a backend future by `timeout`, mapping elapse to [`CacheError::Timeout`].
pub(crate) async fn with_timeout<T, F>(
    backend: &'static str,
    timeout: Duration,
    fut: F,
) -> CacheResult<T>
where
    F: std::future::Future<Output = CacheResult<T>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| CacheError::Timeout { backend, timeout })?
}
