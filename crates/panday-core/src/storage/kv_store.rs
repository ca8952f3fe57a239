//! Key-value store trait.

use std::time::Duration;

use panday_types::error::KvError;

/// Trait for the process-wide key-value store.
///
/// Values are UTF-8 strings; callers serialize structured data themselves.
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist or expired.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, KvError>> + Send;

    /// Set a value, optionally expiring after `ttl`.
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> impl std::future::Future<Output = Result<(), KvError>> + Send;

    /// Delete a key. Returns whether a key was removed.
    fn delete(&self, key: &str)
    -> impl std::future::Future<Output = Result<bool, KvError>> + Send;

    /// Round-trip check. Returns the server's reply (normally `PONG`).
    fn ping(&self) -> impl std::future::Future<Output = Result<String, KvError>> + Send;
}
