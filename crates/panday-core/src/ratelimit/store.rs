//! Counter store port for the sliding-window limiter.

use std::time::Duration;

use panday_types::error::KvError;

use crate::storage::kv_store::KeyValueStore;

/// Store able to run the sliding-window check atomically.
///
/// Network stores evaluate a server-side script; the in-memory store holds a
/// lock for the duration of the check.
pub trait RateLimitStore: KeyValueStore {
    /// Check-and-increment for one request.
    ///
    /// Returns the remaining permits after this request, or `-1` when the
    /// request is rejected (the counter is left untouched in that case).
    fn sliding_window(
        &self,
        current_key: &str,
        previous_key: &str,
        limit: u32,
        now_ms: u64,
        window_ms: u64,
    ) -> impl std::future::Future<Output = Result<i64, KvError>> + Send;

    /// Increment `field` in the hash at `key` and refresh its expiry.
    fn record_analytics(
        &self,
        key: &str,
        field: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), KvError>> + Send;
}
