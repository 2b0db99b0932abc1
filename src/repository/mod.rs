//! Repository layer for database persistence.
//!
//! Saved searches live in SQLite and are accessed through Diesel with
//! diesel-async's sync connection wrapper.

pub mod models;
pub mod pool;
pub mod saved_search;
pub mod util;

pub use pool::{AsyncSqlitePool, DieselError};
pub use saved_search::{DieselSavedSearchRepository, SavedSearchError};

use chrono::{DateTime, Utc};
use diesel_async::SimpleAsyncConnection;
use tracing::debug;

/// Table and index definitions, safe to apply repeatedly.
const SCHEMA_SQL: &str = include_str!("schema_sqlite.sql");

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Create the saved search table and indexes if they are missing.
pub async fn init_schema(pool: &AsyncSqlitePool) -> Result<(), DieselError> {
    let mut conn = pool.get().await?;
    conn.batch_execute(SCHEMA_SQL).await?;
    debug!("Saved search schema ready at {}", pool.database_url());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_datetime() {
        let dt = parse_datetime("2024-05-01T12:00:00.123456Z");
        assert_eq!(dt.timestamp(), 1_714_564_800);
        assert_eq!(parse_datetime("garbage"), DateTime::UNIX_EPOCH);
    }

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let pool = AsyncSqlitePool::from_path(&dir.path().join("schema.db"));
        init_schema(&pool).await.unwrap();
        init_schema(&pool).await.unwrap();

        let repo = DieselSavedSearchRepository::new(pool);
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
