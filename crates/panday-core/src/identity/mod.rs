//! Caller identity: cron authorization, anonymous user cookies, route
//! protection, and session verification.

pub mod cron;
pub mod routes;
pub mod session;
pub mod user_id;
