//! In-process rate-limit store
//!
//! A `DashMap` keyed by the opaque limit key; the entry API gives the
//! atomic check-and-increment the limiter requires. State does not
//! survive restarts and is per process, which is the accepted tradeoff
//! for single-instance deployments.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use super::{RateLimitStore, WindowState};
use crate::errors::Result;
use crate::utils::throttle::Throttle;

struct WindowRecord {
    count: u32,
    reset_at: Instant,
}

pub struct MemoryStore {
    records: DashMap<String, WindowRecord>,
    /// Bounds how often the expired-record sweep may run
    sweep: Throttle,
}

impl MemoryStore {
    pub fn new(sweep_interval: Duration) -> Self {
        Self {
            records: DashMap::new(),
            sweep: Throttle::new(sweep_interval),
        }
    }

    /// Number of live records (expired ones included until swept)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop records whose window has already expired.
    ///
    /// Piggybacked on traffic through a throttle; also callable directly.
    pub fn sweep_expired(&self, now: Instant) {
        let before = self.records.len();
        self.records.retain(|_, record| record.reset_at > now);
        let removed = before - self.records.len();
        if removed > 0 {
            debug!("Rate limit sweep removed {} expired records", removed);
        }
    }

    fn maybe_sweep(&self, now: Instant) {
        self.sweep.run(|| self.sweep_expired(now));
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowState> {
        let now = Instant::now();

        let state = {
            let mut entry = self
                .records
                .entry(key.to_string())
                .or_insert_with(|| WindowRecord {
                    count: 0,
                    reset_at: now + window,
                });

            if now >= entry.reset_at {
                // Window boundary crossed: start fresh
                entry.count = 1;
                entry.reset_at = now + window;
            } else {
                entry.count += 1;
            }

            WindowState {
                count: entry.count,
                resets_in: entry.reset_at.duration_since(now),
            }
        };

        // Entry guard dropped above; safe to scan the map now
        self.maybe_sweep(now);

        Ok(state)
    }
}
