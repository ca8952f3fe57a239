//! HTTP layer for Panday.
//!
//! Axum server exposing the JSON API under `/api/`, the browser relay
//! endpoints and page protection middleware.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
