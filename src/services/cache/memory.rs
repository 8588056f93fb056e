//! In-process backend: a sharded map with per-entry deadlines.
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::services::cache::client::{CacheClient, CacheResult};

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Memory-backed cache client.
///
/// Every operation is a single map call, so `take_string` is atomic per key.
/// Deadlines use tokio's clock.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task that drops expired entries every `interval`.
    ///
    /// Only reclaims memory; reads already ignore expired entries. The task ends
    /// on its own once every clone of the cache is dropped.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let entries: Weak<DashMap<String, Entry>> = Arc::downgrade(&self.entries);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(entries) = entries.upgrade() else {
                    break;
                };
                let removed = sweep(&entries, Instant::now());
                if removed > 0 {
                    tracing::debug!(removed, "swept expired cache entries");
                }
            }
        })
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn sweep(entries: &DashMap<String, Entry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    before.saturating_sub(entries.len())
}

#[async_trait]
impl CacheClient for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let now = Instant::now();
        // Durations too large for the clock are treated as "never" in practice.
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + Duration::from_secs(100 * 365 * 24 * 3600));

        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();

        // The shard guard must be released before removing, hence the two steps.
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn take_string(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();

        Ok(self
            .entries
            .remove(key)
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(_, entry)| entry.value))
    }

    async fn del(&self, key: &str) -> CacheResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::task::JoinSet;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn get_does_not_consume() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("k", "v", HOUR).await.unwrap();

        assert_eq!(cache.get_string("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(cache.get_string("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn set_overwrites_value_and_deadline() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("k", "old", Duration::from_secs(1)).await.unwrap();
        cache.set_with_ttl("k", "new", HOUR).await.unwrap();

        assert_eq!(cache.get_string("k").await.unwrap().as_deref(), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn take_returns_value_once() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("k", "v", HOUR).await.unwrap();

        assert_eq!(cache.take_string("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(cache.take_string("k").await.unwrap(), None);
        assert_eq!(cache.get_string("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn del_reports_whether_key_existed() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("k", "v", HOUR).await.unwrap();

        assert!(cache.del("k").await.unwrap());
        assert!(!cache.del("k").await.unwrap());
        assert!(!cache.del("missing").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_absent_without_sweeping() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("k", "v", Duration::from_secs(1)).await.unwrap();

        tokio::time::advance(Duration::from_millis(999)).await;
        assert_eq!(cache.get_string("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(cache.get_string("k").await.unwrap(), None);
        // lazily reclaimed by the read
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn take_ignores_expired_entry() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("k", "v", Duration::from_secs(1)).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.take_string("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_reclaims_expired_entries() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("short", "v", Duration::from_secs(1)).await.unwrap();
        cache.set_with_ttl("long", "v", HOUR).await.unwrap();

        let handle = cache.spawn_sweeper(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(11)).await;

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_string("long").await.unwrap().as_deref(), Some("v"));
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_stops_when_cache_is_dropped() {
        let cache = MemoryCache::new();
        let handle = cache.spawn_sweeper(Duration::from_secs(1));
        drop(cache);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(handle.is_finished());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_takes_yield_a_single_winner() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("k", "v", HOUR).await.unwrap();

        let mut tasks = JoinSet::new();
        for _ in 0..100 {
            let cache = cache.clone();
            tasks.spawn(async move { cache.take_string("k").await.unwrap() });
        }

        let mut winners = 0;
        while let Some(res) = tasks.join_next().await {
            if res.unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
