//! Debug records kept in the shared key-value store.

use std::sync::Arc;
use std::time::Duration;

use panday_types::error::KvError;
use panday_types::relay::DebugRecord;

use crate::storage::kv_store::KeyValueStore;

/// How long a debug record stays readable.
pub const DEBUG_TTL: Duration = Duration::from_secs(60 * 60);

pub const DEBUG_KEY_PREFIX: &str = "panday:debug";

pub fn debug_key(request_id: &str) -> String {
    format!("{DEBUG_KEY_PREFIX}:{request_id}")
}

/// JSON-serialized [`DebugRecord`]s under `panday:debug:<requestId>`.
pub struct DebugStore<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> DebugStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn save(&self, record: &DebugRecord) -> Result<(), KvError> {
        let json = serde_json::to_string(record)
            .map_err(|e| KvError::Protocol(format!("encode debug record: {e}")))?;
        self.store
            .set(&debug_key(&record.request_id), &json, Some(DEBUG_TTL))
            .await
    }

    pub async fn get(&self, request_id: &str) -> Result<Option<DebugRecord>, KvError> {
        let Some(raw) = self.store.get(&debug_key(request_id)).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| KvError::Protocol(format!("decode debug record: {e}")))
    }
}

impl<S: KeyValueStore> Clone for DebugStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKvStore;
    use chrono::Utc;
    use panday_types::relay::{RequestTimings, TokenUsage};

    fn record(id: &str) -> DebugRecord {
        DebugRecord {
            request_id: id.to_string(),
            created_at: Utc::now(),
            provider: "google".to_string(),
            model: "gemini-2.0-flash".to_string(),
            roadmap_id: Some("electrician-bc".to_string()),
            sources: Vec::new(),
            timings: RequestTimings {
                retrieval_ms: Some(40),
                first_token_ms: Some(300),
                total_ms: Some(1200),
            },
            usage: Some(TokenUsage {
                input_tokens: 812,
                output_tokens: 95,
            }),
            error: None,
        }
    }

    #[tokio::test]
    async fn save_then_get() {
        let kv = Arc::new(MemoryKvStore::new());
        let store = DebugStore::new(Arc::clone(&kv));
        let saved = record("req-1");
        store.save(&saved).await.unwrap();

        assert_eq!(store.get("req-1").await.unwrap(), Some(saved));
        assert!(kv.get("panday:debug:req-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unknown_request_is_none() {
        let store = DebugStore::new(Arc::new(MemoryKvStore::new()));
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_record_is_protocol_error() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.set("panday:debug:bad", "not json", None).await.unwrap();
        let store = DebugStore::new(kv);
        assert!(matches!(
            store.get("bad").await,
            Err(KvError::Protocol(_))
        ));
    }
}
