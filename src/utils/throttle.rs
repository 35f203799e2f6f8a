//! Call-frequency shaping combinators
//!
//! These bound how often an action runs, independent of the server-side
//! request rate limiter:
//!
//! - [`Throttle`] admits a call immediately, then suppresses further calls
//!   until `interval` has passed since the last *admitted* call.
//! - [`Debounce`] defers the action; every call cancels the pending run
//!   and reschedules it, so the action fires once calls go quiet.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Leading-edge throttle.
///
/// The interval restarts on each executed call, not on suppressed
/// attempts.
pub struct Throttle {
    interval: Duration,
    last_run: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: Mutex::new(None),
        }
    }

    /// Returns true when this call is admitted
    pub fn try_admit(&self) -> bool {
        let mut last = self.last_run.lock();
        let now = Instant::now();
        match *last {
            Some(prev) if now.duration_since(prev) < self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Run `action` if admitted; returns whether it ran
    pub fn run<F: FnOnce()>(&self, action: F) -> bool {
        if self.try_admit() {
            action();
            true
        } else {
            false
        }
    }
}

/// Trailing-edge debounce over a spawned tokio task.
pub struct Debounce {
    wait: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debounce {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: Mutex::new(None),
        }
    }

    /// Schedule `action` to run after the wait period, cancelling any
    /// previously scheduled run. Must be called from a tokio runtime.
    pub fn call<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let wait = self.wait;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            action().await;
        });

        let mut pending = self.pending.lock();
        if let Some(prev) = pending.replace(handle) {
            prev.abort();
        }
    }

    /// Drop any pending run without executing it
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for Debounce {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_throttle_admits_first_call_immediately() {
        let throttle = Throttle::new(Duration::from_secs(10));
        assert!(throttle.try_admit());
        assert!(!throttle.try_admit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_interval_resets_on_execution_only() {
        let throttle = Throttle::new(Duration::from_secs(10));
        assert!(throttle.try_admit());

        // Suppressed attempts must not push the window forward
        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(!throttle.try_admit());
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(throttle.try_admit());

        // Fresh window from the admitted call above
        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(!throttle.try_admit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_runs_once_after_calls_stop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let debounce = Debounce::new(Duration::from_millis(100));

        for _ in 0..5 {
            let counter = counter.clone();
            debounce.call(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        // Calls kept arriving within the wait window, so nothing ran yet
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_cancel_drops_pending_run() {
        let counter = Arc::new(AtomicUsize::new(0));
        let debounce = Debounce::new(Duration::from_millis(100));

        let c = counter.clone();
        debounce.call(move || async move {
            c.fetch_add(1, Ordering::SeqCst);
        });
        debounce.cancel();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
