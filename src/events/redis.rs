//! Redis list mirror for the event ring.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{EventLogError, EventMirror, LoggedEvent};

/// Pushes events onto a capped Redis list (newest first).
#[derive(Clone)]
pub struct RedisEventMirror {
    conn: ConnectionManager,
    key: String,
}

impl RedisEventMirror {
    pub async fn new(redis_url: &str, key: &str) -> Result<Self, EventLogError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| EventLogError::Mirror(format!("Redis connection error: {}", e)))?;
        let conn = ConnectionManager::new(client).await.map_err(|e| {
            EventLogError::Mirror(format!("Redis connection manager error: {}", e))
        })?;

        Ok(Self {
            conn,
            key: key.to_string(),
        })
    }
}

#[async_trait]
impl EventMirror for RedisEventMirror {
    async fn push(&self, event: &LoggedEvent, max: usize) -> Result<(), EventLogError> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(event)?;
        let stop = max.saturating_sub(1) as isize;

        redis::pipe()
            .lpush(&self.key, payload)
            .ltrim(&self.key, 0, stop)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| EventLogError::Mirror(e.to_string()))?;

        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<serde_json::Value>, EventLogError> {
        let mut conn = self.conn.clone();
        let stop = limit.saturating_sub(1) as isize;

        let raw: Vec<String> = conn
            .lrange(&self.key, 0, stop)
            .await
            .map_err(|e| EventLogError::Mirror(e.to_string()))?;

        Ok(raw
            .into_iter()
            .map(|v| serde_json::from_str(&v).unwrap_or_else(|_| serde_json::json!({ "value": v })))
            .collect())
    }
}
