//! Article models shared by providers, the search pipeline and the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upstream news source a search is answered from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Rss,
    Newsapi,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Rss, ProviderKind::Newsapi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rss => "rss",
            Self::Newsapi => "newsapi",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "rss" => Some(Self::Rss),
            "newsapi" => Some(Self::Newsapi),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item as returned by a provider, before summarization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub url: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub source: String,
    pub image_url: Option<String>,
}

/// A normalized article with its summary and sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub summary: String,
    /// Range [-1, 1].
    pub sentiment: Option<f64>,
    pub image_url: Option<String>,
}

/// Response envelope for `/api/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub provider: ProviderKind,
    pub count: usize,
    pub articles: Vec<Article>,
}

impl SearchResponse {
    pub fn new(query: impl Into<String>, provider: ProviderKind, articles: Vec<Article>) -> Self {
        Self {
            query: query.into(),
            provider,
            count: articles.len(),
            articles,
        }
    }
}
