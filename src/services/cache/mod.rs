pub mod client;
pub mod factory;
pub mod memcached;
pub mod memory;
pub mod valkey;

use async_trait::async_trait;
use std::time::Duration;

pub use client::{CacheClient, CacheError, CacheResult};
pub use factory::build_cache;
pub use memcached::MemcachedClient;
pub use memory::MemoryCache;
pub use valkey::ValkeyClient;

/// The store selected at startup.
///
/// A closed set of backends behind the single `CacheClient` interface; the rest of
/// the application only ever holds this type.
#[derive(Clone, Debug)]
pub enum Cache {
    Memory(MemoryCache),
    Valkey(ValkeyClient),
    Memcached(MemcachedClient),
}

impl From<MemoryCache> for Cache {
    fn from(cache: MemoryCache) -> Self {
        Self::Memory(cache)
    }
}

impl From<ValkeyClient> for Cache {
    fn from(cache: ValkeyClient) -> Self {
        Self::Valkey(cache)
    }
}

impl From<MemcachedClient> for Cache {
    fn from(cache: MemcachedClient) -> Self {
        Self::Memcached(cache)
    }
}

macro_rules! dispatch {
    ($self:ident, $c:ident => $call:expr) => {
        match $self {
            Cache::Memory($c) => $call,
            Cache::Valkey($c) => $call,
            Cache::Memcached($c) => $call,
        }
    };
}

#[async_trait]
impl CacheClient for Cache {
    fn backend_name(&self) -> &'static str {
        dispatch!(self, c => c.backend_name())
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        dispatch!(self, c => c.set_with_ttl(key, value, ttl).await)
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        dispatch!(self, c => c.get_string(key).await)
    }

    async fn take_string(&self, key: &str) -> CacheResult<Option<String>> {
        dispatch!(self, c => c.take_string(key).await)
    }

    async fn del(&self, key: &str) -> CacheResult<bool> {
        dispatch!(self, c => c.del(key).await)
    }
}
