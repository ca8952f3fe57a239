//! In-process key-value store.
//!
//! Implements both [`KeyValueStore`] and [`RateLimitStore`] with the same
//! observable semantics as the Redis-backed stores, including key expiry.
//! All state sits behind one mutex so the sliding-window check-and-increment
//! is atomic, matching the server-side script it stands in for.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use panday_types::error::KvError;

use crate::ratelimit::store::RateLimitStore;
use crate::storage::kv_store::KeyValueStore;

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    Counter(i64),
    Hash(HashMap<String, i64>),
}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Mutex-guarded map of keys with optional expiry.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Entry>>, KvError> {
        self.entries
            .lock()
            .map_err(|_| KvError::Unavailable("memory store lock poisoned".to_string()))
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .map(|map| map.values().filter(|e| e.is_live(now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a hash field (analytics counters).
    pub fn hash_field(&self, key: &str, field: &str) -> Option<i64> {
        let now = Instant::now();
        let map = self.entries.lock().ok()?;
        match map.get(key).filter(|e| e.is_live(now)).map(|e| &e.value) {
            Some(Value::Hash(h)) => h.get(field).copied(),
            _ => None,
        }
    }
}

fn counter_of(map: &HashMap<String, Entry>, key: &str, now: Instant) -> i64 {
    match map.get(key).filter(|e| e.is_live(now)).map(|e| &e.value) {
        Some(Value::Counter(n)) => *n,
        Some(Value::Text(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let now = Instant::now();
        let map = self.lock()?;
        Ok(match map.get(key).filter(|e| e.is_live(now)).map(|e| &e.value) {
            Some(Value::Text(s)) => Some(s.clone()),
            Some(Value::Counter(n)) => Some(n.to_string()),
            Some(Value::Hash(_)) => {
                return Err(KvError::Command(
                    "WRONGTYPE Operation against a key holding the wrong kind of value"
                        .to_string(),
                ));
            }
            None => None,
        })
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), KvError> {
        let mut map = self.lock()?;
        map.insert(
            key.to_string(),
            Entry {
                value: Value::Text(value.to_string()),
                expires_at: ttl.map(|t| Instant::now() + t),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        let now = Instant::now();
        let mut map = self.lock()?;
        Ok(map.remove(key).is_some_and(|e| e.is_live(now)))
    }

    async fn ping(&self) -> Result<String, KvError> {
        Ok("PONG".to_string())
    }
}

impl RateLimitStore for MemoryKvStore {
    async fn sliding_window(
        &self,
        current_key: &str,
        previous_key: &str,
        limit: u32,
        now_ms: u64,
        window_ms: u64,
    ) -> Result<i64, KvError> {
        let now = Instant::now();
        let mut map = self.lock()?;
        map.retain(|_, e| e.is_live(now));

        let current = counter_of(&map, current_key, now);
        let previous = counter_of(&map, previous_key, now);
        let weighted_previous = crate::ratelimit::weighted_previous(previous, now_ms, window_ms);

        if weighted_previous + current >= i64::from(limit) {
            return Ok(-1);
        }

        let updated = current + 1;
        let expires_at = match map.get(current_key) {
            Some(existing) if current > 0 => existing.expires_at,
            _ => Some(now + Duration::from_millis(window_ms * 2 + 1000)),
        };
        map.insert(
            current_key.to_string(),
            Entry {
                value: Value::Counter(updated),
                expires_at,
            },
        );

        Ok(i64::from(limit) - (updated + weighted_previous))
    }

    async fn record_analytics(&self, key: &str, field: &str, ttl: Duration) -> Result<(), KvError> {
        let now = Instant::now();
        let mut map = self.lock()?;
        let entry = map
            .entry(key.to_string())
            .and_modify(|e| {
                if !e.is_live(now) {
                    e.value = Value::Hash(HashMap::new());
                }
            })
            .or_insert_with(|| Entry {
                value: Value::Hash(HashMap::new()),
                expires_at: None,
            });
        entry.expires_at = Some(now + ttl);
        match &mut entry.value {
            Value::Hash(h) => *h.entry(field.to_string()).or_insert(0) += 1,
            other => *other = Value::Hash(HashMap::from([(field.to_string(), 1)])),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let store = MemoryKvStore::new();
        store.set("a", "1", None).await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert_eq!(store.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn ttl_expires_keys() {
        let store = MemoryKvStore::new();
        store
            .set("short", "v", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        assert!(store.get("short").await.unwrap().is_some());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(store.get("short").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn ping_replies_pong() {
        assert_eq!(MemoryKvStore::new().ping().await.unwrap(), "PONG");
    }

    #[tokio::test]
    async fn sliding_window_rejects_at_limit() {
        let store = MemoryKvStore::new();
        let window = 60_000;
        let now = 120_000;
        for expected_remaining in (0..3).rev() {
            let remaining = store
                .sliding_window("k:2", "k:1", 3, now, window)
                .await
                .unwrap();
            assert_eq!(remaining, expected_remaining);
        }
        assert_eq!(
            store.sliding_window("k:2", "k:1", 3, now, window).await.unwrap(),
            -1
        );
        assert_eq!(store.get("k:2").await.unwrap().as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn analytics_counts_fields() {
        let store = MemoryKvStore::new();
        let ttl = Duration::from_secs(60);
        store.record_analytics("an", "user:success", ttl).await.unwrap();
        store.record_analytics("an", "user:success", ttl).await.unwrap();
        store.record_analytics("an", "user:blocked", ttl).await.unwrap();
        assert_eq!(store.hash_field("an", "user:success"), Some(2));
        assert_eq!(store.hash_field("an", "user:blocked"), Some(1));
        assert!(store.get("an").await.is_err());
    }
}
