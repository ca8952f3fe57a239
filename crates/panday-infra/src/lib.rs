//! Infrastructure layer for Panday.
//!
//! Implements the ports defined in `panday-core`: SQLite repositories, the
//! Redis and REST key-value clients, the filesystem roadmap source, the
//! embeddings HTTP client, OpenAI-compatible chat models and session JWT
//! verification. [`config::AppConfig`] reads the environment.

pub mod auth;
pub mod config;
pub mod embeddings;
pub mod filesystem;
pub mod kv;
pub mod llm;
pub mod sqlite;
