use async_trait::async_trait;
use std::time::Duration;

use crate::services::cache::client::{CacheClient, CacheError, CacheResult, with_timeout};

const BACKEND: &str = "redis";

/// Valkey/Redis-backend cache client.
///
/// Single-key commands are atomic on the server, so the one-shot read is a plain
/// `GETDEL` (Redis >= 6.2, any Valkey).
#[derive(Clone, Debug)]
pub struct ValkeyClient {
    manager: redis::aio::ConnectionManager,
    timeout: Duration,
}

impl ValkeyClient {
    // Create a Valkey client from a URL like `redis://:password@localhost:6379`
    pub async fn new(url: &str, timeout: Duration) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(|e| CacheError::unavailable(BACKEND, e))?;

        let manager = with_timeout(BACKEND, timeout, async {
            client
                .get_connection_manager()
                .await
                .map_err(|e| CacheError::unavailable(BACKEND, e))
        })
        .await?;

        Ok(Self { manager, timeout })
    }

    async fn query<T>(&self, cmd: redis::Cmd) -> CacheResult<T>
    where
        T: redis::FromRedisValue + Send,
    {
        // Use a clone of the connection manager
        let mut conn = self.manager.clone();

        with_timeout(BACKEND, self.timeout, async move {
            cmd.query_async(&mut conn)
                .await
                .map_err(|e| CacheError::unavailable(BACKEND, e))
        })
        .await
    }
}

/// `PX` takes whole milliseconds; anything shorter still gets 1 ms rather than
/// being rejected by the server.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl CacheClient for ValkeyClient {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        // SET <key> <value> PX <millis>
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("PX").arg(ttl_millis(ttl));

        let _: () = self.query(cmd).await?;
        Ok(())
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);

        self.query(cmd).await
    }

    async fn take_string(&self, key: &str) -> CacheResult<Option<String>> {
        // GETDEL returns the value and removes the key in one step; nil if absent.
        let mut cmd = redis::cmd("GETDEL");
        cmd.arg(key);

        self.query(cmd).await
    }

    async fn del(&self, key: &str) -> CacheResult<bool> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);

        // DEL returns number of keys removed (0 or 1 for a single key).
        let n: u64 = self.query(cmd).await?;
        Ok(n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_millis_keeps_sub_second_precision() {
        assert_eq!(ttl_millis(Duration::from_secs_f64(1.08)), 1080);
        assert_eq!(ttl_millis(Duration::from_secs(3600)), 3_600_000);
    }

    #[test]
    fn ttl_millis_never_sends_zero() {
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
    }
}
