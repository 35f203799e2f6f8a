//! Fixed-window rate limiting for the public write surface
//!
//! Time is divided into non-overlapping windows per key; a counter tracks
//! requests within the current window and resets at the boundary. The
//! counter state lives behind the [`RateLimitStore`] trait so single-
//! instance deployments run on the in-process map while multi-instance
//! deployments can share a Redis store.

mod memory;
mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::config::RateLimitConfig;
use crate::errors::Result;

/// Per-endpoint limiting policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Login attempts: 10 per minute per IP
pub const LOGIN_POLICY: RateLimitPolicy = RateLimitPolicy::new(10, 60);
/// Registrations: 5 per 5 minutes per IP
pub const REGISTER_POLICY: RateLimitPolicy = RateLimitPolicy::new(5, 300);
/// Review submissions: 10 per minute per IP
pub const REVIEW_POLICY: RateLimitPolicy = RateLimitPolicy::new(10, 60);

/// Counter state after a recorded hit
#[derive(Debug, Clone, Copy)]
pub struct WindowState {
    /// Requests seen in the current window, including this one
    pub count: u32,
    /// Time left until the window resets
    pub resets_in: Duration,
}

/// Injectable counter storage.
///
/// `hit` must be atomic per key: concurrent callers may never observe a
/// lost increment.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Record a hit for `key`, opening a fresh window when none is
    /// active, and return the resulting state.
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowState>;
}

/// Outcome of a limiter check
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Time until the caller may retry (meaningful when denied)
    pub retry_after: Duration,
}

impl RateLimitDecision {
    /// Retry-After header value: seconds, rounded up, at least 1
    pub fn retry_after_secs(&self) -> u64 {
        let millis = self.retry_after.as_millis() as u64;
        millis.div_ceil(1000).max(1)
    }
}

/// Fixed-window limiter over an injected store
#[derive(Clone)]
pub struct FixedWindowLimiter {
    store: Arc<dyn RateLimitStore>,
}

impl FixedWindowLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self { store }
    }

    /// Build the limiter from configuration ("memory" or "redis" backend)
    pub fn from_config(config: &RateLimitConfig) -> Result<Self> {
        let store: Arc<dyn RateLimitStore> = match config.backend.as_str() {
            "redis" => Arc::new(RedisStore::new(
                &config.redis_url,
                &config.redis_key_prefix,
            )?),
            _ => Arc::new(MemoryStore::new(Duration::from_secs(
                config.sweep_interval_secs,
            ))),
        };
        Ok(Self::new(store))
    }

    /// Check whether a request under `key` is allowed.
    ///
    /// Store failures fail open: telemetry-grade protection must not take
    /// the public surface down with it.
    pub async fn check(&self, key: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        match self.store.hit(key, policy.window).await {
            Ok(state) => RateLimitDecision {
                allowed: state.count <= policy.max_requests,
                retry_after: state.resets_in,
            },
            Err(e) => {
                warn!("Rate limit store error for key '{}': {}", key, e);
                RateLimitDecision {
                    allowed: true,
                    retry_after: Duration::ZERO,
                }
            }
        }
    }

    /// Boolean-only form for call sites that don't report retry timing
    pub async fn is_limited(&self, key: &str, policy: RateLimitPolicy) -> bool {
        !self.check(key, policy).await.allowed
    }
}

/// Compose a rate-limit key from an endpoint scope and the client IP
pub fn ip_key(scope: &str, ip: &str) -> String {
    format!("{}:{}", scope, ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_key_format() {
        assert_eq!(ip_key("review", "203.0.113.9"), "review:203.0.113.9");
        assert_eq!(ip_key("login", "::1"), "login:::1");
    }

    #[test]
    fn test_retry_after_secs_rounds_up() {
        let decision = RateLimitDecision {
            allowed: false,
            retry_after: Duration::from_millis(1500),
        };
        assert_eq!(decision.retry_after_secs(), 2);

        let decision = RateLimitDecision {
            allowed: false,
            retry_after: Duration::from_millis(10),
        };
        assert_eq!(decision.retry_after_secs(), 1);
    }

    #[test]
    fn test_builtin_policies() {
        assert_eq!(LOGIN_POLICY.max_requests, 10);
        assert_eq!(LOGIN_POLICY.window, Duration::from_secs(60));
        assert_eq!(REGISTER_POLICY.max_requests, 5);
        assert_eq!(REGISTER_POLICY.window, Duration::from_secs(300));
        assert_eq!(REVIEW_POLICY.max_requests, 10);
    }
}
