//! Key-value store clients.
//!
//! [`KvClient`] is the single process-wide handle, chosen once at startup:
//! the REST store in production, native Redis in development, or the
//! in-process store for runs without any server.

pub mod native;
pub mod script;
pub mod upstash;

use std::sync::Arc;
use std::time::Duration;

use panday_core::ratelimit::store::RateLimitStore;
use panday_core::storage::MemoryKvStore;
use panday_core::storage::kv_store::KeyValueStore;
use panday_types::config::KvProvider;
use panday_types::error::KvError;

use crate::config::AppConfig;

pub use native::RedisKvStore;
pub use upstash::UpstashKvStore;

pub enum KvClient {
    Upstash(UpstashKvStore),
    Redis(RedisKvStore),
    Memory(Arc<MemoryKvStore>),
}

impl KvClient {
    /// Provider label for status reports.
    pub fn provider(&self) -> KvProvider {
        match self {
            KvClient::Upstash(_) => KvProvider::Upstash,
            KvClient::Redis(_) | KvClient::Memory(_) => KvProvider::LocalRedis,
        }
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, KvClient::Memory(_))
    }
}

/// Open the key-value client for this process.
///
/// `memory` forces the in-process store. Otherwise production talks to the
/// REST store and development to native Redis at `REDIS_URL`.
pub async fn connect(config: &AppConfig, memory: bool) -> Result<KvClient, KvError> {
    if memory {
        tracing::warn!("using in-process key-value store; limits reset on restart");
        return Ok(KvClient::Memory(Arc::new(MemoryKvStore::new())));
    }
    match (config.kv_provider(), config.upstash.as_ref()) {
        (KvProvider::Upstash, Some(upstash)) => {
            let store = UpstashKvStore::new(&upstash.url, upstash.token.clone())?;
            tracing::info!(provider = %KvProvider::Upstash, "key-value store ready");
            Ok(KvClient::Upstash(store))
        }
        (KvProvider::Upstash, None) => Err(KvError::Unavailable(
            "UPSTASH_REDIS_REST_URL and UPSTASH_REDIS_REST_TOKEN must be set when PRODUCTION is true"
                .to_string(),
        )),
        (KvProvider::LocalRedis, _) => {
            let store = RedisKvStore::connect(&config.redis_url).await?;
            tracing::info!(provider = %KvProvider::LocalRedis, url = %config.redis_url, "key-value store ready");
            Ok(KvClient::Redis(store))
        }
    }
}

impl std::fmt::Debug for KvClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            KvClient::Upstash(_) => "upstash",
            KvClient::Redis(_) => "redis",
            KvClient::Memory(_) => "memory",
        };
        f.debug_tuple("KvClient").field(&kind).finish()
    }
}

impl KeyValueStore for KvClient {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        match self {
            KvClient::Upstash(store) => store.get(key).await,
            KvClient::Redis(store) => store.get(key).await,
            KvClient::Memory(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), KvError> {
        match self {
            KvClient::Upstash(store) => store.set(key, value, ttl).await,
            KvClient::Redis(store) => store.set(key, value, ttl).await,
            KvClient::Memory(store) => store.set(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        match self {
            KvClient::Upstash(store) => store.delete(key).await,
            KvClient::Redis(store) => store.delete(key).await,
            KvClient::Memory(store) => store.delete(key).await,
        }
    }

    async fn ping(&self) -> Result<String, KvError> {
        match self {
            KvClient::Upstash(store) => store.ping().await,
            KvClient::Redis(store) => store.ping().await,
            KvClient::Memory(store) => store.ping().await,
        }
    }
}

impl RateLimitStore for KvClient {
    async fn sliding_window(
        &self,
        current_key: &str,
        previous_key: &str,
        limit: u32,
        now_ms: u64,
        window_ms: u64,
    ) -> Result<i64, KvError> {
        match self {
            KvClient::Upstash(store) => {
                store
                    .sliding_window(current_key, previous_key, limit, now_ms, window_ms)
                    .await
            }
            KvClient::Redis(store) => {
                store
                    .sliding_window(current_key, previous_key, limit, now_ms, window_ms)
                    .await
            }
            KvClient::Memory(store) => {
                store
                    .sliding_window(current_key, previous_key, limit, now_ms, window_ms)
                    .await
            }
        }
    }

    async fn record_analytics(&self, key: &str, field: &str, ttl: Duration) -> Result<(), KvError> {
        match self {
            KvClient::Upstash(store) => store.record_analytics(key, field, ttl).await,
            KvClient::Redis(store) => store.record_analytics(key, field, ttl).await,
            KvClient::Memory(store) => store.record_analytics(key, field, ttl).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panday_core::ratelimit::{RateLimitConfig, RateLimiter};

    #[tokio::test]
    async fn memory_client_serves_limiter_and_values() {
        let client = Arc::new(KvClient::Memory(Arc::new(MemoryKvStore::new())));
        assert_eq!(client.provider(), KvProvider::LocalRedis);
        assert!(client.is_memory());
        assert_eq!(client.ping().await.unwrap(), "PONG");

        let limiter = RateLimiter::new(Arc::clone(&client), RateLimitConfig::chat(true)).unwrap();
        let decision = limiter.limit("user_1").await.unwrap();
        assert!(decision.success);
        assert_eq!(decision.remaining, 29);
    }

    #[tokio::test]
    async fn connect_honours_memory_flag_and_production() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert!(connect(&config, true).await.unwrap().is_memory());

        let config = AppConfig::from_lookup(|name| {
            (name == "PRODUCTION").then(|| "true".to_string())
        })
        .unwrap();
        assert!(matches!(
            connect(&config, false).await,
            Err(KvError::Unavailable(_))
        ));
    }
}
