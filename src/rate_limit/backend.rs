//! Storage abstraction for request counters.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::Quota;

/// Errors from rate limit storage.
#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Invalid rate limit {0:?}; expected N/second|minute|hour|day")]
    InvalidQuota(String),

    #[error("Rate limit backend error: {0}")]
    Backend(String),
}

pub type RateLimitResult<T> = Result<T, RateLimitError>;

/// Outcome of counting one request against a quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Requests left in the current window after this one.
    pub remaining: u32,
    /// Time until the current window resets.
    pub reset_after: Duration,
}

impl RateDecision {
    /// Build a decision from the post-increment hit count.
    pub fn from_count(quota: &Quota, count: u64, reset_after: Duration) -> Self {
        let limit = u64::from(quota.limit);
        Self {
            allowed: count <= limit,
            remaining: limit.saturating_sub(count) as u32,
            reset_after,
        }
    }

    /// Whole seconds a client should wait before retrying (at least 1).
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs.max(1)
        }
    }
}

/// Counter storage for fixed-window limiting.
#[async_trait]
pub trait RateLimitBackend: Send + Sync {
    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Count one request for `key` and decide whether it fits `quota`.
    async fn hit(&self, key: &str, quota: &Quota) -> RateLimitResult<RateDecision>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_from_count() {
        let quota = Quota::per_second(2);
        let d = RateDecision::from_count(&quota, 1, Duration::from_millis(400));
        assert!(d.allowed);
        assert_eq!(d.remaining, 1);

        let d = RateDecision::from_count(&quota, 2, Duration::from_millis(400));
        assert!(d.allowed);
        assert_eq!(d.remaining, 0);

        let d = RateDecision::from_count(&quota, 3, Duration::from_millis(400));
        assert!(!d.allowed);
        assert_eq!(d.remaining, 0);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let quota = Quota::per_minute(1);
        let at = |ms| RateDecision::from_count(&quota, 2, Duration::from_millis(ms));
        assert_eq!(at(400).retry_after_secs(), 1);
        assert_eq!(at(0).retry_after_secs(), 1);
        assert_eq!(at(2000).retry_after_secs(), 2);
        assert_eq!(at(59_001).retry_after_secs(), 60);
    }
}
