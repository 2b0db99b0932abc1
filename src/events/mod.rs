//! Search event log.
//!
//! Every search (and any manually emitted payload) is recorded as a
//! [`LoggedEvent`] in a bounded in-memory ring. When a mirror is configured
//! the same events are pushed to a shared Redis list so that all workers
//! can read one combined history.

#[cfg(feature = "redis-backend")]
mod redis;

#[cfg(feature = "redis-backend")]
pub use self::redis::RedisEventMirror;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::ProviderKind;

/// Default number of events kept in the ring.
pub const DEFAULT_RING_MAX: usize = 200;
/// Default Redis list key for the shared ring.
pub const DEFAULT_RING_KEY: &str = "finnews:events";
/// Key attached to manually emitted events.
pub const MANUAL_KEY: &str = "manual";

/// Errors from event storage.
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("Event mirror error: {0}")]
    Mirror(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Payload describing one completed search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEvent {
    pub ts: String,
    pub query: String,
    pub limit: usize,
    pub provider: ProviderKind,
    pub count: usize,
    pub ip: String,
}

impl SearchEvent {
    pub fn new(query: &str, limit: usize, provider: ProviderKind, count: usize, ip: &str) -> Self {
        Self {
            ts: Utc::now().to_rfc3339(),
            query: query.to_string(),
            limit,
            provider,
            count,
            ip: ip.to_string(),
        }
    }
}

/// An event as stored in the ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub offset: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub ts_iso: String,
    pub key: Option<String>,
    pub value: serde_json::Value,
}

/// Recent events and where they were read from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentEvents {
    pub count: usize,
    pub items: Vec<serde_json::Value>,
    pub source: &'static str,
}

/// Shared storage that mirrors the in-memory ring.
#[async_trait]
pub trait EventMirror: Send + Sync {
    /// Push one event, trimming the shared ring to `max` entries.
    async fn push(&self, event: &LoggedEvent, max: usize) -> Result<(), EventLogError>;

    /// Newest-first events, at most `limit`.
    async fn recent(&self, limit: usize) -> Result<Vec<serde_json::Value>, EventLogError>;
}

/// Bounded event ring with an optional shared mirror.
pub struct EventLog {
    max: usize,
    ring: Mutex<VecDeque<LoggedEvent>>,
    next_offset: AtomicU64,
    mirror: Option<Arc<dyn EventMirror>>,
}

impl EventLog {
    pub fn new(max: usize) -> Self {
        Self {
            max: max.max(1),
            ring: Mutex::new(VecDeque::new()),
            next_offset: AtomicU64::new(0),
            mirror: None,
        }
    }

    pub fn with_mirror(mut self, mirror: Arc<dyn EventMirror>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn capacity(&self) -> usize {
        self.max
    }

    pub fn has_mirror(&self) -> bool {
        self.mirror.is_some()
    }

    /// Record an event now. Mirror failures are logged, never returned.
    pub async fn record(&self, key: Option<String>, value: serde_json::Value) -> LoggedEvent {
        self.record_at(Utc::now(), key, value).await
    }

    async fn record_at(
        &self,
        at: DateTime<Utc>,
        key: Option<String>,
        value: serde_json::Value,
    ) -> LoggedEvent {
        let event = LoggedEvent {
            offset: self.next_offset.fetch_add(1, Ordering::Relaxed),
            timestamp: at.timestamp_millis(),
            ts_iso: at.to_rfc3339_opts(SecondsFormat::Millis, false),
            key,
            value,
        };

        {
            let mut ring = self.ring.lock().await;
            if ring.len() >= self.max {
                ring.pop_front();
            }
            ring.push_back(event.clone());
        }
        debug!("Recorded event offset={} key={:?}", event.offset, event.key);

        if let Some(mirror) = &self.mirror {
            if let Err(e) = mirror.push(&event, self.max).await {
                warn!("Event mirror push failed: {}", e);
            }
        }

        event
    }

    /// Record a completed search, keyed by its query.
    pub async fn record_search(&self, search: &SearchEvent) -> Result<LoggedEvent, EventLogError> {
        let value = serde_json::to_value(search)?;
        Ok(self.record(Some(search.query.clone()), value).await)
    }

    /// Record a manual payload. String payloads holding JSON are stored decoded.
    pub async fn emit(&self, data: serde_json::Value) -> LoggedEvent {
        let value = match data {
            serde_json::Value::String(s) => {
                serde_json::from_str(&s).unwrap_or(serde_json::Value::String(s))
            }
            other => other,
        };
        self.record(Some(MANUAL_KEY.to_string()), value).await
    }

    /// Up to `limit` recent events: from the mirror when it has any, else the
    /// in-memory ring (oldest first).
    pub async fn recent(&self, limit: usize) -> RecentEvents {
        if let Some(mirror) = &self.mirror {
            match mirror.recent(limit).await {
                Ok(items) if !items.is_empty() => {
                    return RecentEvents {
                        count: items.len(),
                        items,
                        source: "redis",
                    };
                }
                Ok(_) => {}
                Err(e) => debug!("Event mirror read failed, using memory: {}", e),
            }
        }

        let ring = self.ring.lock().await;
        let skip = ring.len().saturating_sub(limit);
        let items: Vec<serde_json::Value> = ring
            .iter()
            .skip(skip)
            .filter_map(|e| serde_json::to_value(e).ok())
            .collect();
        RecentEvents {
            count: items.len(),
            items,
            source: "memory",
        }
    }

    /// Number of events currently held in memory.
    pub async fn len(&self) -> usize {
        self.ring.lock().await.len()
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("max", &self.max)
            .field("mirror", &self.mirror.is_some())
            .finish_non_exhaustive()
    }
}
