//! Debug and log relay: per-request debug records and browser log ingestion.

pub mod debug_store;
pub mod log;

pub use debug_store::DebugStore;
pub use log::{LogLevel, relay_client_log};
