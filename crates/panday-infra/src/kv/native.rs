//! Native Redis client for local development.
//!
//! Wraps a `ConnectionManager`, which reconnects on its own after the server
//! restarts. The manager is cheap to clone; each command clones it to get a
//! mutable handle.

use std::time::Duration;

use panday_core::ratelimit::store::RateLimitStore;
use panday_core::storage::kv_store::KeyValueStore;
use panday_types::error::KvError;
use redis::aio::ConnectionManager;

use super::script::SLIDING_WINDOW_SCRIPT;

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

fn command_error(e: redis::RedisError) -> KvError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() {
        KvError::Unavailable(e.to_string())
    } else {
        KvError::Command(e.to_string())
    }
}

#[derive(Clone)]
pub struct RedisKvStore {
    conn: ConnectionManager,
    script: redis::Script,
}

impl RedisKvStore {
    /// Connect to `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, KvError> {
        let client = redis::Client::open(url).map_err(|e| KvError::Unavailable(e.to_string()))?;
        let conn = ConnectionManager::new(client).await.map_err(command_error)?;
        tracing::info!(url, "connected to redis");
        Ok(Self {
            conn,
            script: redis::Script::new(SLIDING_WINDOW_SCRIPT),
        })
    }
}

impl std::fmt::Debug for RedisKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisKvStore").finish_non_exhaustive()
    }
}

impl KeyValueStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), KvError> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(ttl.as_millis() as u64);
        }
        let _: () = cmd.query_async(&mut conn).await.map_err(command_error)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        let mut conn = self.conn.clone();
        let removed: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> Result<String, KvError> {
        let mut conn = self.conn.clone();
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(reply)
    }
}

impl RateLimitStore for RedisKvStore {
    async fn sliding_window(
        &self,
        current_key: &str,
        previous_key: &str,
        limit: u32,
        now_ms: u64,
        window_ms: u64,
    ) -> Result<i64, KvError> {
        let mut conn = self.conn.clone();
        let remaining: i64 = self
            .script
            .key(current_key)
            .key(previous_key)
            .arg(limit)
            .arg(now_ms)
            .arg(window_ms)
            .arg(1)
            .invoke_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(remaining)
    }

    async fn record_analytics(&self, key: &str, field: &str, ttl: Duration) -> Result<(), KvError> {
        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .cmd("HINCRBY")
            .arg(key)
            .arg(field)
            .arg(1)
            .ignore()
            .cmd("EXPIRE")
            .arg(key)
            .arg(ttl.as_secs())
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panday_core::ratelimit::{RateLimitConfig, RateLimiter};
    use std::sync::Arc;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string())
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn limiter_admits_thirty_then_rejects() {
        let store = Arc::new(RedisKvStore::connect(&redis_url()).await.unwrap());
        let identifier = format!("test-{}", uuid::Uuid::new_v4());
        let limiter = RateLimiter::new(Arc::clone(&store), RateLimitConfig::chat(false)).unwrap();

        for _ in 0..30 {
            assert!(limiter.limit(&identifier).await.unwrap().success);
        }
        let rejected = limiter.limit(&identifier).await.unwrap();
        assert!(!rejected.success);
        assert_eq!(rejected.remaining, 0);

        limiter.reset(&identifier).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn set_get_delete_round_trip() {
        let store = RedisKvStore::connect(&redis_url()).await.unwrap();
        let key = format!("panday:test:{}", uuid::Uuid::new_v4());
        store.set(&key, "value", Some(Duration::from_secs(10))).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("value"));
        assert!(store.delete(&key).await.unwrap());
        assert_eq!(store.ping().await.unwrap(), "PONG");
    }
}
