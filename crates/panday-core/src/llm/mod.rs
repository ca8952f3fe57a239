//! Chat model port.
//!
//! The retrieval chat streams answers from a single configured provider.
//! Implementations live in panday-infra (OpenAI-compatible endpoints).

pub mod provider;

pub use provider::{ChatModel, EventStream};
