//! Factory: build the configured `Cache` from application settings.
use tokio::task::JoinHandle;

use crate::config::{CacheBackend, CacheSettings};
use crate::services::cache::{
    Cache, CacheClient, CacheError, MemcachedClient, MemoryCache, ValkeyClient,
};

/// A connected store plus the in-process sweeper, if one was started.
pub struct BuiltCache {
    pub cache: Cache,
    pub sweeper: Option<JoinHandle<()>>,
}

pub async fn build_cache(settings: &CacheSettings) -> Result<BuiltCache, CacheError> {
    if let Some(raw) = settings.unrecognized_backend.as_deref() {
        // Falling back keeps the service up, but it is no longer the store that was asked for.
        tracing::warn!(
            requested = raw,
            "unrecognized CACHE_BACKEND, falling back to in-process memory store"
        );
    }

    let built = match settings.backend {
        CacheBackend::Memory => {
            let cache = MemoryCache::new();
            let sweeper = settings
                .sweep_interval
                .map(|interval| cache.spawn_sweeper(interval));

            BuiltCache {
                cache: cache.into(),
                sweeper,
            }
        }
        CacheBackend::Redis => {
            let url = settings
                .redis
                .url()
                .map_err(|e| CacheError::unavailable("redis", e))?;
            let client = ValkeyClient::new(url.as_str(), settings.op_timeout).await?;

            BuiltCache {
                cache: client.into(),
                sweeper: None,
            }
        }
        CacheBackend::Memcached => {
            let client = MemcachedClient::new(
                &settings.memcached.host,
                settings.memcached.port,
                settings.op_timeout,
            )
            .await?;

            BuiltCache {
                cache: client.into(),
                sweeper: None,
            }
        }
    };

    tracing::info!(backend = built.cache.backend_name(), "cache backend ready");
    Ok(built)
}
