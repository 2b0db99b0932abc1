//! In-process rate limit storage.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::backend::{RateDecision, RateLimitBackend, RateLimitResult};
use super::Quota;

/// Sweep expired windows once the map grows past this many keys.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    period: Duration,
    count: u64,
}

impl Window {
    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.started) >= self.period
    }
}

/// Fixed-window counters kept in memory (single process only).
#[derive(Debug, Default)]
pub struct InMemoryRateLimitBackend {
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimitBackend {
    pub fn new() -> Self {
        Self::default()
    }

    async fn hit_at(&self, key: &str, quota: &Quota, now: Instant) -> RateDecision {
        let mut windows = self.windows.lock().await;

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, w| !w.expired(now));
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            period: quota.period,
            count: 0,
        });
        if window.expired(now) {
            *window = Window {
                started: now,
                period: quota.period,
                count: 0,
            };
        }
        window.count += 1;

        let reset_after = window
            .period
            .saturating_sub(now.duration_since(window.started));
        RateDecision::from_count(quota, window.count, reset_after)
    }
}

#[async_trait]
impl RateLimitBackend for InMemoryRateLimitBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn hit(&self, key: &str, quota: &Quota) -> RateLimitResult<RateDecision> {
        Ok(self.hit_at(key, quota, Instant::now()).await)
    }
}
