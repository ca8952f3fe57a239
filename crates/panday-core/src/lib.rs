//! Business logic and port trait definitions for Panday.
//!
//! This crate defines the "ports" (repository, key-value, roadmap source,
//! session and model traits) that the infrastructure layer implements, plus
//! the pure logic built on top of them. It depends only on `panday-types` --
//! never on `panday-infra` or any database/network crate.

pub mod chat;
pub mod event;
pub mod identity;
pub mod llm;
pub mod profile;
pub mod ratelimit;
pub mod relay;
pub mod repository;
pub mod retrieval;
pub mod roadmap;
pub mod service;
pub mod status;
pub mod storage;
