//! Inbound per-client rate limiting.
//!
//! Requests are counted in fixed windows keyed by client and route scope.
//! Counters live in memory by default, or in Redis when the `redis-backend`
//! feature is enabled and a URL is configured.

mod backend;
mod client;
mod memory;
mod quota;
#[cfg(feature = "redis-backend")]
mod redis;

pub use backend::{RateDecision, RateLimitBackend, RateLimitError, RateLimitResult};
pub use client::{client_key, pick_client_ip, ClientIp, IpSource, UNKNOWN_IP};
pub use memory::InMemoryRateLimitBackend;
pub use quota::Quota;
#[cfg(feature = "redis-backend")]
pub use self::redis::RedisRateLimitBackend;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

/// Route-specific quotas applied on top of the default.
pub fn default_route_quotas() -> HashMap<&'static str, Quota> {
    HashMap::from([
        ("/api/health", Quota::per_second(1)),
        ("/api/whoami", Quota::per_second(2)),
        ("/api/diag/addr", Quota::per_second(2)),
        ("/api/search", Quota::per_second(5)),
    ])
}

/// Applies quotas to request keys using a storage backend.
#[derive(Clone)]
pub struct RateLimiter {
    backend: Arc<dyn RateLimitBackend>,
    default_quota: Quota,
    route_quotas: Arc<HashMap<&'static str, Quota>>,
}

impl RateLimiter {
    /// Create a limiter with the standard per-route overrides.
    pub fn new(backend: Arc<dyn RateLimitBackend>, default_quota: Quota) -> Self {
        Self {
            backend,
            default_quota,
            route_quotas: Arc::new(default_route_quotas()),
        }
    }

    /// In-memory limiter.
    pub fn in_memory(default_quota: Quota) -> Self {
        Self::new(Arc::new(InMemoryRateLimitBackend::new()), default_quota)
    }

    /// Replace the per-route overrides.
    pub fn with_route_quotas(mut self, quotas: HashMap<&'static str, Quota>) -> Self {
        self.route_quotas = Arc::new(quotas);
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Quota for a path: its override if one exists, else the default.
    pub fn quota_for(&self, path: &str) -> (&str, Quota) {
        match self.route_quotas.get_key_value(path) {
            Some((route, quota)) => (*route, *quota),
            None => ("default", self.default_quota),
        }
    }

    /// Count a request from `client` to `path`.
    ///
    /// Backend failures let the request through.
    pub async fn check(&self, client: &str, path: &str) -> RateDecision {
        let (scope, quota) = self.quota_for(path);
        let key = format!("{}|{}", scope, client);
        match self.backend.hit(&key, &quota).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!("Rate limit backend {} failed: {}", self.backend.name(), e);
                RateDecision {
                    allowed: true,
                    remaining: quota.limit,
                    reset_after: quota.period,
                }
            }
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("backend", &self.backend.name())
            .field("default_quota", &self.default_quota)
            .finish()
    }
}

/// Build the configured backend: Redis when a URL is given and the feature is
/// enabled, otherwise in-memory.
pub async fn create_backend(redis_url: Option<&str>) -> Arc<dyn RateLimitBackend> {
    #[cfg(feature = "redis-backend")]
    if let Some(url) = redis_url {
        match RedisRateLimitBackend::new(url).await {
            Ok(backend) => return Arc::new(backend),
            Err(e) => warn!("Falling back to in-memory rate limiting: {}", e),
        }
    }

    #[cfg(not(feature = "redis-backend"))]
    if redis_url.is_some() {
        warn!("REDIS_URL set but built without redis-backend; using in-memory rate limiting");
    }

    Arc::new(InMemoryRateLimitBackend::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FailingBackend;

    #[async_trait]
    impl RateLimitBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn hit(&self, _key: &str, _quota: &Quota) -> RateLimitResult<RateDecision> {
            Err(RateLimitError::Backend("down".to_string()))
        }
    }

    #[test]
    fn test_route_overrides() {
        let limiter = RateLimiter::in_memory(Quota::per_minute(60));
        assert_eq!(limiter.quota_for("/api/search"), ("/api/search", Quota::per_second(5)));
        assert_eq!(limiter.quota_for("/api/health").1, Quota::per_second(1));
        assert_eq!(limiter.quota_for("/api/whoami").1, Quota::per_second(2));
        assert_eq!(limiter.quota_for("/api/saved"), ("default", Quota::per_minute(60)));
    }

    #[tokio::test]
    async fn test_scopes_are_separate() {
        let limiter = RateLimiter::in_memory(Quota::per_minute(1));
        assert!(limiter.check("1.2.3.4", "/api/diag").await.allowed);
        // Same default scope for every non-overridden path.
        assert!(!limiter.check("1.2.3.4", "/api/saved").await.allowed);
        // The search override has its own window.
        assert!(limiter.check("1.2.3.4", "/api/search").await.allowed);
        // Other clients are unaffected.
        assert!(limiter.check("5.6.7.8", "/api/diag").await.allowed);
    }

    #[tokio::test]
    async fn test_backend_failure_allows() {
        let limiter = RateLimiter::new(Arc::new(FailingBackend), Quota::per_second(1));
        let decision = limiter.check("k", "/api/diag").await;
        assert!(decision.allowed);
        assert_eq!(limiter.backend_name(), "failing");
    }

    #[tokio::test]
    async fn test_create_backend_defaults_to_memory() {
        let backend = create_backend(None).await;
        assert_eq!(backend.name(), "memory");
    }
}
