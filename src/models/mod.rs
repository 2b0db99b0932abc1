//! Data models for finnews.

mod article;
mod saved_search;

pub use article::{Article, ProviderKind, RawArticle, SearchResponse};
pub use saved_search::{
    NewSavedSearch, SavedSearch, SavedSearchOrder, SavedSearchPage, SavedSearchQuery, SortDir,
    MAX_NAME_LEN,
};
