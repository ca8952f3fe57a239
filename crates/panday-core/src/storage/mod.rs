//! Shared key-value storage abstractions.
//!
//! Defines the key-value port used for cached request data and health
//! checks, plus an in-process implementation used by tests and by local
//! runs without a Redis server. Network implementations live in panday-infra.

pub mod kv_store;
pub mod memory;

pub use kv_store::KeyValueStore;
pub use memory::MemoryKvStore;
