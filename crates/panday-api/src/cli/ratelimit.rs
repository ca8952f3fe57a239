//! Rate limiter maintenance commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use serde_json::json;

use panday_core::ratelimit::{RateLimitConfig, RateLimiter};
use panday_infra::config::AppConfig;
use panday_infra::kv;

/// Delete the chat limiter windows for `identifier`.
pub async fn reset(config: &AppConfig, memory_kv: bool, identifier: &str, json: bool) -> Result<()> {
    let store = kv::connect(config, memory_kv)
        .await
        .context("failed to connect to the key-value store")?;
    let limiter = RateLimiter::new(Arc::new(store), RateLimitConfig::chat(config.production))?;
    let removed = limiter.reset(identifier).await?;
    tracing::info!(identifier, removed, "rate limit reset");

    if json {
        let out = json!({ "identifier": identifier, "removedKeys": removed });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    if removed == 0 {
        println!(
            "  {} No active window for '{}'",
            style("○").dim(),
            identifier
        );
    } else {
        println!(
            "  {} Reset rate limit for '{}' ({} key(s) removed)",
            style("✓").green(),
            style(identifier).cyan(),
            removed
        );
    }
    println!();
    Ok(())
}
