//! Saved search models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a saved search name, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// A named, persisted set of search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: i32,
    pub name: String,
    /// Arbitrary JSON object of search parameters.
    pub params: serde_json::Map<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Incoming payload for creating a saved search.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSavedSearch {
    pub name: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl NewSavedSearch {
    /// Check the name length constraint (1..=200 characters).
    pub fn validate(&self) -> Result<(), String> {
        let len = self.name.chars().count();
        if len == 0 {
            return Err("name must not be empty".to_string());
        }
        if len > MAX_NAME_LEN {
            return Err(format!("name must be at most {} characters", MAX_NAME_LEN));
        }
        Ok(())
    }
}

/// Column a saved-search listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavedSearchOrder {
    #[default]
    Id,
    CreatedAt,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Desc,
    Asc,
}

/// A keyset-paginated listing request.
#[derive(Debug, Clone, Default)]
pub struct SavedSearchQuery {
    /// Case-insensitive substring filter on the name.
    pub q: Option<String>,
    pub limit: usize,
    /// Keyset cursor: `id < cursor` when descending, `id > cursor` when ascending.
    pub cursor: Option<i32>,
    pub order: SavedSearchOrder,
    pub dir: SortDir,
}

/// One page of saved searches.
#[derive(Debug, Clone, Serialize)]
pub struct SavedSearchPage {
    pub items: Vec<SavedSearch>,
    pub next_cursor: Option<i32>,
}
