//! Per-request tool event distribution.

pub mod hub;

pub use hub::ToolEventHub;
