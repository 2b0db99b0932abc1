//! Redis-backed rate limiter for multi-process deployments.
//!
//! Each window is a counter key that expires with the window, so all
//! workers sharing the Redis instance see the same counts.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use super::backend::{RateDecision, RateLimitBackend, RateLimitError, RateLimitResult};
use super::Quota;

/// Key prefix for rate limit counters in Redis.
const KEY_PREFIX: &str = "finnews:ratelimit:";

/// Redis-backed fixed-window counters.
#[derive(Clone)]
pub struct RedisRateLimitBackend {
    conn: ConnectionManager,
}

impl RedisRateLimitBackend {
    /// Connect to Redis.
    ///
    /// # Arguments
    /// * `redis_url` - Redis connection URL (e.g., "redis://localhost:6379")
    pub async fn new(redis_url: &str) -> RateLimitResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| RateLimitError::Backend(format!("Redis connection error: {}", e)))?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            RateLimitError::Backend(format!("Redis connection manager error: {}", e))
        })?;

        Ok(Self { conn })
    }

    fn counter_key(&self, key: &str, quota: &Quota) -> String {
        format!("{}{}:{}", KEY_PREFIX, quota.period_secs(), key)
    }
}

#[async_trait]
impl RateLimitBackend for RedisRateLimitBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn hit(&self, key: &str, quota: &Quota) -> RateLimitResult<RateDecision> {
        let mut conn = self.conn.clone();
        let counter = self.counter_key(key, quota);
        let period = quota.period_secs();

        // SET NX starts the window with its expiry; INCR counts this request.
        let (count, ttl): (u64, i64) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&counter)
            .arg(0)
            .arg("EX")
            .arg(period)
            .arg("NX")
            .ignore()
            .incr(&counter, 1)
            .ttl(&counter)
            .query_async(&mut conn)
            .await
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        let reset_after = if ttl > 0 {
            Duration::from_secs(ttl as u64)
        } else {
            Duration::from_secs(period)
        };
        Ok(RateDecision::from_count(quota, count, reset_after))
    }
}

impl std::fmt::Debug for RedisRateLimitBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRateLimitBackend").finish_non_exhaustive()
    }
}
