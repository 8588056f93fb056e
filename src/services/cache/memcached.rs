use async_trait::async_trait;
use std::{fmt, sync::Arc, time::Duration};

use crate::services::cache::client::{CacheClient, CacheError, CacheResult, with_timeout};

const BACKEND: &str = "memcached";

// Connections per client; every call holds one for its duration.
const POOL_SIZE: u32 = 8;

// memcached reads expirations above 30 days as absolute unix timestamps.
const RELATIVE_EXPIRATION_LIMIT: u64 = 60 * 60 * 24 * 30;

/// Memcached-backend cache client.
///
/// The `memcache` client is blocking, so every call runs on the blocking pool.
/// Memcached has no atomic get-and-delete; `take_string` reads first and then
/// deletes, and only the caller whose delete actually removed the key keeps the
/// value. Ids are never rewritten, so the value read is the value deleted.
#[derive(Clone)]
pub struct MemcachedClient {
    client: Arc<memcache::Client>,
    endpoint: String,
    timeout: Duration,
}

impl fmt::Debug for MemcachedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemcachedClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl MemcachedClient {
    pub async fn new(host: &str, port: u16, timeout: Duration) -> CacheResult<Self> {
        let endpoint = format!("{host}:{port}");
        let url = format!(
            "memcache://{endpoint}?timeout={}&protocol=ascii",
            timeout.as_secs_f64()
        );

        let client = with_timeout(BACKEND, timeout, async move {
            tokio::task::spawn_blocking(move || {
                memcache::Client::with_pool_size(url.as_str(), POOL_SIZE)
            })
            .await
            .map_err(|e| CacheError::unavailable(BACKEND, e))?
            .map_err(|e| CacheError::unavailable(BACKEND, e))
        })
        .await?;

        Ok(Self {
            client: Arc::new(client),
            endpoint,
            timeout,
        })
    }

    async fn run<T, F>(&self, op: F) -> CacheResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&memcache::Client) -> Result<T, memcache::MemcacheError> + Send + 'static,
    {
        let client = Arc::clone(&self.client);

        with_timeout(BACKEND, self.timeout, async move {
            tokio::task::spawn_blocking(move || op(&client))
                .await
                .map_err(|e| CacheError::unavailable(BACKEND, e))?
                .map_err(|e| CacheError::unavailable(BACKEND, e))
        })
        .await
    }
}

/// Convert a TTL to a memcached expiration value.
///
/// Rounded to whole seconds (minimum 1, since 0 means "never expire"), and
/// switched to an absolute timestamp past the 30 day limit.
fn expiration(ttl: Duration, now_unix: i64) -> CacheResult<u32> {
    let secs = (ttl.as_secs_f64().round() as u64).max(1);

    let value = if secs > RELATIVE_EXPIRATION_LIMIT {
        u64::try_from(now_unix).unwrap_or(0).saturating_add(secs)
    } else {
        secs
    };

    u32::try_from(value)
        .map_err(|_| CacheError::InvalidValue(format!("ttl {ttl:?} exceeds memcached range")))
}

#[async_trait]
impl CacheClient for MemcachedClient {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let exp = expiration(ttl, chrono::Utc::now().timestamp())?;
        let key = key.to_string();
        let value = value.to_string();

        self.run(move |c| c.set(&key, value.as_str(), exp)).await
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        let key = key.to_string();
        self.run(move |c| c.get::<String>(&key)).await
    }

    async fn take_string(&self, key: &str) -> CacheResult<Option<String>> {
        let key = key.to_string();

        self.run(move |c| {
            let Some(value) = c.get::<String>(&key)? else {
                return Ok(None);
            };
            // Another reader may have fetched the same value; the delete decides.
            if c.delete(&key)? {
                Ok(Some(value))
            } else {
                Ok(None)
            }
        })
        .await
    }

    async fn del(&self, key: &str) -> CacheResult<bool> {
        let key = key.to_string();
        self.run(move |c| c.delete(&key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn short_ttls_round_to_whole_seconds() {
        assert_eq!(expiration(Duration::from_secs_f64(1.08), NOW).unwrap(), 1);
        assert_eq!(expiration(Duration::from_secs(3600), NOW).unwrap(), 3600);
    }

    #[test]
    fn sub_second_ttl_is_not_sent_as_never() {
        assert_eq!(expiration(Duration::from_millis(100), NOW).unwrap(), 1);
    }

    #[test]
    fn long_ttls_become_absolute_timestamps() {
        let ttl = Duration::from_secs(RELATIVE_EXPIRATION_LIMIT + 1);
        let exp = expiration(ttl, NOW).unwrap();
        assert_eq!(u64::from(exp), NOW as u64 + RELATIVE_EXPIRATION_LIMIT + 1);
    }

    #[test]
    fn exactly_thirty_days_stays_relative() {
        let ttl = Duration::from_secs(RELATIVE_EXPIRATION_LIMIT);
        assert_eq!(
            u64::from(expiration(ttl, NOW).unwrap()),
            RELATIVE_EXPIRATION_LIMIT
        );
    }
}
