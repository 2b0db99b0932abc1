//! Upstream news providers.
//!
//! Each provider turns a free-text query into a list of [`RawArticle`]s.
//! Summarization and sentiment happen later in `services::search`.

mod http_client;
mod newsapi;
mod rss;

pub use http_client::{HttpClient, USER_AGENT};
pub use newsapi::{expand_query, NewsApiProvider, NEWSAPI_ENDPOINT};
pub use rss::{RssProvider, GOOGLE_NEWS_BASE, YAHOO_FINANCE_BASE};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::RawArticle;

/// Errors raised while talking to an upstream provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("{provider}: {message}")]
    Upstream {
        provider: &'static str,
        message: String,
    },

    #[error("NEWSAPI_KEY not set; use provider=rss or set the key.")]
    MissingApiKey,

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Extra filters honored by providers that support them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Inclusive start date, `YYYY-MM-DD`.
    pub date_from: Option<String>,
    /// Inclusive end date, `YYYY-MM-DD`.
    pub date_to: Option<String>,
    /// Comma-separated domains, e.g. `reuters.com,bloomberg.com`.
    pub domains: Option<String>,
    /// Comma-separated provider source ids.
    pub sources: Option<String>,
}

impl FetchOptions {
    /// Builder-style setter for a source filter.
    pub fn with_sources(mut self, sources: impl Into<String>) -> Self {
        self.sources = Some(sources.into());
        self
    }

    /// Builder-style setter for a domain filter.
    pub fn with_domains(mut self, domains: impl Into<String>) -> Self {
        self.domains = Some(domains.into());
        self
    }
}

/// A source of raw news items.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Short identifier (`rss`, `newsapi`).
    fn name(&self) -> &'static str;

    /// Fetch at most `limit` items matching `query`.
    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        options: &FetchOptions,
    ) -> Result<Vec<RawArticle>, ProviderError>;
}
