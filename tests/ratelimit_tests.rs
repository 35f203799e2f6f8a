//! Fixed-window rate limiter tests
//!
//! Property under test: for maxRequests=N and window=W, exactly N calls
//! within W are allowed, the (N+1)th is denied with retry_after <= W,
//! and a call after W succeeds with a fresh counter. Time is driven by
//! the paused tokio clock.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use qrmenu::errors::{QrMenuError, Result};
use qrmenu::ratelimit::{
    FixedWindowLimiter, MemoryStore, RateLimitPolicy, RateLimitStore, REVIEW_POLICY, WindowState,
    ip_key,
};

fn memory_limiter() -> FixedWindowLimiter {
    // Long sweep spacing so sweeps never interfere with window tests
    FixedWindowLimiter::new(Arc::new(MemoryStore::new(Duration::from_secs(3600))))
}

#[tokio::test(start_paused = true)]
async fn test_exactly_n_requests_allowed_within_window() {
    let limiter = memory_limiter();
    let policy = RateLimitPolicy::new(5, 60);
    let key = ip_key("review", "203.0.113.10");

    for i in 0..5 {
        let decision = limiter.check(&key, policy).await;
        assert!(decision.allowed, "request {} should pass", i + 1);
    }

    let denied = limiter.check(&key, policy).await;
    assert!(!denied.allowed);
    assert!(denied.retry_after <= Duration::from_secs(60));
    assert!(denied.retry_after > Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_window_resets_after_expiry() {
    let limiter = memory_limiter();
    let policy = RateLimitPolicy::new(3, 60);
    let key = ip_key("login", "203.0.113.11");

    for _ in 0..3 {
        assert!(limiter.check(&key, policy).await.allowed);
    }
    assert!(!limiter.check(&key, policy).await.allowed);

    // Crossing the boundary starts a fresh window with count 1
    tokio::time::advance(Duration::from_secs(61)).await;
    let decision = limiter.check(&key, policy).await;
    assert!(decision.allowed);

    // The fresh window still enforces its own cap
    assert!(limiter.check(&key, policy).await.allowed);
    assert!(limiter.check(&key, policy).await.allowed);
    assert!(!limiter.check(&key, policy).await.allowed);
}

#[tokio::test(start_paused = true)]
async fn test_denied_requests_do_not_extend_the_window() {
    let limiter = memory_limiter();
    let policy = RateLimitPolicy::new(1, 60);
    let key = ip_key("review", "203.0.113.12");

    assert!(limiter.check(&key, policy).await.allowed);

    // Hammering while denied must not push the reset time forward
    for _ in 0..10 {
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(!limiter.check(&key, policy).await.allowed);
    }

    tokio::time::advance(Duration::from_secs(15)).await; // past the 60s mark
    assert!(limiter.check(&key, policy).await.allowed);
}

#[tokio::test(start_paused = true)]
async fn test_keys_do_not_interfere() {
    let limiter = memory_limiter();
    let policy = RateLimitPolicy::new(1, 60);

    assert!(limiter.check(&ip_key("review", "10.0.0.1"), policy).await.allowed);
    assert!(!limiter.check(&ip_key("review", "10.0.0.1"), policy).await.allowed);

    // Different IP and different scope both have fresh windows
    assert!(limiter.check(&ip_key("review", "10.0.0.2"), policy).await.allowed);
    assert!(limiter.check(&ip_key("login", "10.0.0.1"), policy).await.allowed);
}

#[tokio::test(start_paused = true)]
async fn test_is_limited_boolean_form() {
    let limiter = memory_limiter();
    let key = ip_key("review", "203.0.113.13");

    for _ in 0..REVIEW_POLICY.max_requests {
        assert!(!limiter.is_limited(&key, REVIEW_POLICY).await);
    }
    assert!(limiter.is_limited(&key, REVIEW_POLICY).await);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_hits_are_not_lost() {
    let store = Arc::new(MemoryStore::new(Duration::from_secs(3600)));
    let limiter = FixedWindowLimiter::new(store.clone());
    let policy = RateLimitPolicy::new(50, 60);

    let mut handles = Vec::new();
    for _ in 0..80 {
        let limiter = limiter.clone();
        handles.push(tokio::spawn(async move {
            limiter.check("burst:1.2.3.4", policy).await.allowed
        }));
    }

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            allowed += 1;
        }
    }

    // Check-and-increment is atomic per key: exactly the cap passes
    assert_eq!(allowed, 50);
}

#[tokio::test(start_paused = true)]
async fn test_fail_open_on_store_error() {
    struct BrokenStore;

    #[async_trait]
    impl RateLimitStore for BrokenStore {
        async fn hit(&self, _key: &str, _window: Duration) -> Result<WindowState> {
            Err(QrMenuError::database_connection("redis down"))
        }
    }

    let limiter = FixedWindowLimiter::new(Arc::new(BrokenStore));
    let decision = limiter.check("any", REVIEW_POLICY).await;
    assert!(decision.allowed);
}

#[tokio::test(start_paused = true)]
async fn test_memory_store_sweep_bounds_growth() {
    let store = Arc::new(MemoryStore::new(Duration::from_secs(10)));
    let limiter = FixedWindowLimiter::new(store.clone());
    let policy = RateLimitPolicy::new(10, 30);

    for i in 0..100 {
        let key = ip_key("review", &format!("198.51.100.{}", i));
        limiter.check(&key, policy).await;
    }
    assert_eq!(store.len(), 100);

    // All windows expire; the next hit admits a sweep (throttle interval
    // has passed) which drops the stale records
    tokio::time::advance(Duration::from_secs(31)).await;
    limiter.check("fresh:key", policy).await;
    assert_eq!(store.len(), 1);
}
