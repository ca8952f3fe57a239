//! Shared domain types for Panday.
//!
//! This crate contains the domain types used across the Panday backend:
//! roadmaps, node progress, user profiles, chat threads, FAQs, relay events,
//! system status, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod faq;
pub mod llm;
pub mod profile;
pub mod progress;
pub mod relay;
pub mod roadmap;
pub mod status;
