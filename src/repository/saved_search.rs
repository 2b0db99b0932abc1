//! Diesel-based saved search repository for SQLite.

use chrono::{SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use diesel_async::RunQueryDsl;
use thiserror::Error;

use super::models::{NewSavedSearchRecord, SavedSearchRecord};
use super::parse_datetime;
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::{escape_like, is_unique_violation};
use crate::models::{
    NewSavedSearch, SavedSearch, SavedSearchOrder, SavedSearchPage, SavedSearchQuery, SortDir,
};
use crate::schema::saved_searches;

diesel::define_sql_function!(fn lower(x: Text) -> Text);

/// Errors from saved search operations.
#[derive(Debug, Error)]
pub enum SavedSearchError {
    #[error("Saved search name already exists: {0}")]
    Conflict(String),

    #[error("Saved search not found: {0}")]
    NotFound(i32),

    #[error("Database error: {0}")]
    Database(#[from] DieselError),
}

impl From<SavedSearchRecord> for SavedSearch {
    fn from(record: SavedSearchRecord) -> Self {
        SavedSearch {
            id: record.id,
            name: record.name,
            params: serde_json::from_str(&record.params).unwrap_or_default(),
            created_at: parse_datetime(&record.created_at),
        }
    }
}

/// Saved search persistence.
#[derive(Clone, Debug)]
pub struct DieselSavedSearchRepository {
    pool: AsyncSqlitePool,
}

impl DieselSavedSearchRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &AsyncSqlitePool {
        &self.pool
    }

    /// Get a saved search by ID.
    pub async fn get(&self, id: i32) -> Result<Option<SavedSearch>, DieselError> {
        let mut conn = self.pool.get().await?;

        saved_searches::table
            .find(id)
            .select(SavedSearchRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(SavedSearch::from))
    }

    /// One keyset page. The cursor is always an id: rows after it in the
    /// requested direction are returned, ordered by the chosen column with
    /// id as tie-break.
    pub async fn list(&self, query: &SavedSearchQuery) -> Result<SavedSearchPage, DieselError> {
        let mut conn = self.pool.get().await?;
        let limit = query.limit.max(1);

        let mut stmt = saved_searches::table
            .select(SavedSearchRecord::as_select())
            .into_boxed::<Sqlite>();

        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", escape_like(&q.to_lowercase()));
            stmt = stmt.filter(lower(saved_searches::name).like(pattern).escape('\\'));
        }

        if let Some(cursor) = query.cursor {
            stmt = match query.dir {
                SortDir::Desc => stmt.filter(saved_searches::id.lt(cursor)),
                SortDir::Asc => stmt.filter(saved_searches::id.gt(cursor)),
            };
        }

        stmt = match (query.order, query.dir) {
            (SavedSearchOrder::Id, SortDir::Desc) => stmt.order(saved_searches::id.desc()),
            (SavedSearchOrder::Id, SortDir::Asc) => stmt.order(saved_searches::id.asc()),
            (SavedSearchOrder::CreatedAt, SortDir::Desc) => stmt.order((
                saved_searches::created_at.desc(),
                saved_searches::id.desc(),
            )),
            (SavedSearchOrder::CreatedAt, SortDir::Asc) => {
                stmt.order((saved_searches::created_at.asc(), saved_searches::id.asc()))
            }
        };

        let mut records: Vec<SavedSearchRecord> = stmt
            .limit(limit as i64 + 1)
            .load(&mut conn)
            .await?;

        let next_cursor = if records.len() > limit {
            records.truncate(limit);
            records.last().map(|r| r.id)
        } else {
            None
        };

        Ok(SavedSearchPage {
            items: records.into_iter().map(SavedSearch::from).collect(),
            next_cursor,
        })
    }

    /// Insert a saved search and return the stored row.
    pub async fn create(&self, new: &NewSavedSearch) -> Result<SavedSearch, SavedSearchError> {
        let mut conn = self.pool.get().await?;

        let params = serde_json::to_string(&new.params).unwrap_or_else(|_| "{}".to_string());
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let inserted = diesel::insert_into(saved_searches::table)
            .values(NewSavedSearchRecord {
                name: &new.name,
                params: &params,
                created_at: &created_at,
            })
            .execute(&mut conn)
            .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(SavedSearchError::Conflict(new.name.clone()))
            }
            Err(e) => return Err(e.into()),
        }

        let record = saved_searches::table
            .filter(saved_searches::name.eq(&new.name))
            .select(SavedSearchRecord::as_select())
            .first(&mut conn)
            .await?;

        Ok(record.into())
    }

    /// Delete a saved search by ID.
    pub async fn delete(&self, id: i32) -> Result<(), SavedSearchError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::delete(saved_searches::table.find(id))
            .execute(&mut conn)
            .await?;

        if rows == 0 {
            return Err(SavedSearchError::NotFound(id));
        }
        Ok(())
    }

    /// Total number of saved searches.
    pub async fn count(&self) -> Result<i64, DieselError> {
        let mut conn = self.pool.get().await?;

        saved_searches::table
            .count()
            .get_result(&mut conn)
            .await
    }
}
