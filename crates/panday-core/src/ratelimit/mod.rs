//! Sliding-window rate limiting.
//!
//! Counters live in the shared key-value store, one per identifier per
//! window. A request is admitted when the current window's count plus the
//! previous window's count, weighted by how much of the previous window still
//! overlaps the sliding interval, stays below the limit.

pub mod store;

use std::sync::Arc;
use std::time::Duration;

use panday_types::error::RateLimitError;

pub use store::RateLimitStore;

/// Key prefix shared with the hosted limiter the chat route used before.
pub const DEFAULT_PREFIX: &str = "@upstash/ratelimit/chat";
pub const DEFAULT_LIMIT: u32 = 30;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

const ANALYTICS_TTL: Duration = Duration::from_secs(60 * 60 * 24);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub limit: u32,
    pub window: Duration,
    pub prefix: String,
    /// Count successes and rejections per identifier.
    pub analytics: bool,
}

impl RateLimitConfig {
    /// Chat limiter: 30 requests per minute, analytics in production only.
    pub fn chat(production: bool) -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            window: DEFAULT_WINDOW,
            prefix: DEFAULT_PREFIX.to_string(),
            analytics: production,
        }
    }

    fn window_ms(&self) -> u64 {
        self.window.as_millis() as u64
    }
}

/// Outcome of one limiter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub success: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Unix milliseconds at which the current window ends.
    pub reset_ms: u64,
}

/// Previous-window count scaled by its remaining overlap.
pub fn weighted_previous(previous: i64, now_ms: u64, window_ms: u64) -> i64 {
    if window_ms == 0 {
        return 0;
    }
    let elapsed = (now_ms % window_ms) as f64 / window_ms as f64;
    ((1.0 - elapsed) * previous as f64).floor() as i64
}

/// Sliding-window limiter over a [`RateLimitStore`].
pub struct RateLimiter<S: RateLimitStore> {
    store: Arc<S>,
    config: RateLimitConfig,
}

impl<S: RateLimitStore> RateLimiter<S> {
    pub fn new(store: Arc<S>, config: RateLimitConfig) -> Result<Self, RateLimitError> {
        if config.limit == 0 {
            return Err(RateLimitError::Config("limit must be positive".to_string()));
        }
        if config.window.as_millis() == 0 {
            return Err(RateLimitError::Config("window must be positive".to_string()));
        }
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    fn window_keys(&self, identifier: &str, now_ms: u64) -> (String, String, u64) {
        let window_ms = self.config.window_ms();
        let window = now_ms / window_ms;
        let current = format!("{}:{}:{}", self.config.prefix, identifier, window);
        let previous = format!(
            "{}:{}:{}",
            self.config.prefix,
            identifier,
            window.saturating_sub(1)
        );
        (current, previous, (window + 1) * window_ms)
    }

    /// Check and consume one permit for `identifier` now.
    pub async fn limit(&self, identifier: &str) -> Result<RateLimitDecision, RateLimitError> {
        let now_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
        self.limit_at(identifier, now_ms).await
    }

    /// Check and consume one permit at an explicit timestamp.
    pub async fn limit_at(
        &self,
        identifier: &str,
        now_ms: u64,
    ) -> Result<RateLimitDecision, RateLimitError> {
        let (current, previous, reset_ms) = self.window_keys(identifier, now_ms);
        let remaining = self
            .store
            .sliding_window(
                &current,
                &previous,
                self.config.limit,
                now_ms,
                self.config.window_ms(),
            )
            .await?;

        let decision = RateLimitDecision {
            success: remaining >= 0,
            limit: self.config.limit,
            remaining: remaining.max(0) as u32,
            reset_ms,
        };

        if !decision.success {
            tracing::debug!(identifier, reset_ms, "rate limit exceeded");
        }
        if self.config.analytics {
            self.record(identifier, now_ms, decision.success).await;
        }
        Ok(decision)
    }

    async fn record(&self, identifier: &str, now_ms: u64, success: bool) {
        let hour = now_ms / (60 * 60 * 1000);
        let key = format!("{}:analytics:{}", self.config.prefix, hour);
        let field = format!(
            "{}:{}",
            identifier,
            if success { "success" } else { "blocked" }
        );
        if let Err(e) = self.store.record_analytics(&key, &field, ANALYTICS_TTL).await {
            tracing::warn!(error = %e, key = %key, "failed to record rate limit analytics");
        }
    }

    /// Forget the current and previous window counters for `identifier`.
    pub async fn reset(&self, identifier: &str) -> Result<u32, RateLimitError> {
        let now_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let (current, previous, _) = self.window_keys(identifier, now_ms);
        let mut removed = 0;
        for key in [current, previous] {
            if self.store.delete(&key).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
