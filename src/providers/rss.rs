//! RSS provider backed by Google News search and Yahoo Finance headlines.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::DateTime;
use futures::future::join_all;
use tracing::{debug, warn};

use super::{FetchOptions, HttpClient, NewsProvider, ProviderError};
use crate::models::RawArticle;
use crate::services::strip_html;

pub const GOOGLE_NEWS_BASE: &str = "https://news.google.com/rss/search";
pub const YAHOO_FINANCE_BASE: &str = "https://feeds.finance.yahoo.com/rss/2.0/headline";

/// Source label used when neither the entry nor the feed names one.
const DEFAULT_SOURCE: &str = "RSS";

/// Keyless provider that merges several public finance feeds.
#[derive(Debug, Clone)]
pub struct RssProvider {
    http: HttpClient,
    google_base: String,
    yahoo_base: String,
}

impl RssProvider {
    pub fn new(http: HttpClient) -> Self {
        Self::with_endpoints(http, GOOGLE_NEWS_BASE, YAHOO_FINANCE_BASE)
    }

    /// Use alternate feed endpoints (local mirrors, tests).
    pub fn with_endpoints(http: HttpClient, google_base: &str, yahoo_base: &str) -> Self {
        Self {
            http,
            google_base: google_base.to_string(),
            yahoo_base: yahoo_base.to_string(),
        }
    }

    /// Feed URLs for a query, in fetch order.
    pub fn feed_urls(&self, query: &str) -> Vec<String> {
        let q = feed_query(query);
        vec![
            format!(
                "{}?q={}+when:7d+finance&hl=en-US&gl=US&ceid=US:en",
                self.google_base, q
            ),
            format!("{}?s={}&region=US&lang=en-US", self.yahoo_base, q),
        ]
    }
}

#[async_trait]
impl NewsProvider for RssProvider {
    fn name(&self) -> &'static str {
        "rss"
    }

    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        _options: &FetchOptions,
    ) -> Result<Vec<RawArticle>, ProviderError> {
        let urls = self.feed_urls(query);
        let bodies = join_all(urls.iter().map(|url| self.http.get_bytes(url))).await;

        let mut items = Vec::new();
        for (url, body) in urls.iter().zip(bodies) {
            let body = match body {
                Ok(body) => body,
                Err(e) => {
                    warn!("Skipping feed {}: {}", url, e);
                    continue;
                }
            };
            match parse_feed(&body, limit) {
                Ok(parsed) => {
                    debug!("Parsed {} entries from {}", parsed.len(), url);
                    items.extend(parsed);
                }
                Err(e) => warn!("Skipping unparseable feed {}: {}", url, e),
            }
        }

        Ok(merge_items(items, limit))
    }
}

/// Encode a query for feed URLs: terms are percent-encoded and joined by `+`.
fn feed_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|term| urlencoding::encode(term).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}

/// Parse an RSS/Atom document into raw items, keeping the first `limit` entries.
pub fn parse_feed(body: &[u8], limit: usize) -> Result<Vec<RawArticle>, ProviderError> {
    let feed = feed_rs::parser::parse(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let feed_title = feed
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty());

    let items = feed
        .entries
        .into_iter()
        .take(limit)
        .map(|entry| {
            let title = strip_html(&entry.title.map(|t| t.content).unwrap_or_default());
            let url = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();
            let description = entry
                .summary
                .map(|s| s.content)
                .filter(|s| !s.is_empty())
                .or_else(|| entry.content.and_then(|c| c.body))
                .map(|s| strip_html(&s))
                .unwrap_or_default();
            let source = entry
                .source
                .as_deref()
                .and_then(source_label)
                .or_else(|| feed_title.clone())
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

            RawArticle {
                title,
                url,
                description,
                published_at: entry.published,
                source,
                image_url: None,
            }
        })
        .collect();

    Ok(items)
}

/// Readable label for an entry's `<source>`: the host of a URL (minus `www.`),
/// or the trimmed text itself.
fn source_label(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match url::Url::parse(raw) {
        Ok(parsed) => parsed
            .host_str()
            .map(|h| h.strip_prefix("www.").unwrap_or(h).to_string()),
        Err(_) => Some(raw.to_string()),
    }
}

/// Drop duplicates (by url, else title), sort newest first and truncate.
pub fn merge_items(items: Vec<RawArticle>, limit: usize) -> Vec<RawArticle> {
    let mut seen = HashSet::new();
    let mut deduped: Vec<RawArticle> = items
        .into_iter()
        .filter(|item| {
            let key = if item.url.is_empty() {
                item.title.clone()
            } else {
                item.url.clone()
            };
            seen.insert(key)
        })
        .collect();

    deduped.sort_by_key(|item| {
        std::cmp::Reverse(item.published_at.unwrap_or(DateTime::UNIX_EPOCH))
    });
    deduped.truncate(limit);
    deduped
}
