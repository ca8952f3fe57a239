//! HTTP request handlers, one module per resource.

pub mod chat;
pub mod cron;
pub mod faq;
pub mod profile;
pub mod progress;
pub mod relay;
pub mod roadmap;
pub mod status;
pub mod threads;
