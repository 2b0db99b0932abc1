//! NewsAPI (`/v2/everything`) provider.
//!
//! Searches run in up to three passes, returning the first that yields
//! anything: a full-text search, a title-only search, then a broadened
//! finance-terms search.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::{FetchOptions, HttpClient, NewsProvider, ProviderError};
use crate::models::RawArticle;

pub const NEWSAPI_ENDPOINT: &str = "https://newsapi.org/v2/everything";

/// NewsAPI caps `pageSize` at this value for our plan.
const MAX_PAGE_SIZE: usize = 50;

/// Aggregators that only republish other outlets' headlines.
const AGGREGATOR_BLOCKLIST: &[&str] = &["biztoc.com"];

const FINANCE_TERMS: &str = "(earnings OR guidance OR upgrade OR downgrade OR outlook)";

const TICKER_MAP: &[(&str, &str)] = &[
    ("AAPL", "Apple"),
    ("MSFT", "Microsoft"),
    ("GOOGL", "Google"),
    ("GOOG", "Google"),
    ("AMZN", "Amazon"),
    ("NVDA", "Nvidia"),
    ("META", "Meta"),
    ("TSLA", "Tesla"),
    ("ORCL", "Oracle"),
    ("IBM", "IBM"),
    ("NFLX", "Netflix"),
];

static TERM_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+OR\s+|,").unwrap());

/// Expand ticker symbols into `(TICKER OR Company)` groups.
///
/// The query is split on `OR` and commas; duplicate terms (case-insensitive)
/// are dropped. Returns the original query when it has no terms.
pub fn expand_query(query: &str) -> String {
    let mut seen = HashSet::new();
    let mut terms = Vec::new();

    for raw in TERM_SPLIT_RE.split(query) {
        let term = raw.trim();
        if term.is_empty() {
            continue;
        }
        let ticker: String = term
            .to_uppercase()
            .chars()
            .filter(|c| c.is_ascii_uppercase())
            .collect();
        let expanded = match TICKER_MAP.iter().find(|(t, _)| *t == ticker) {
            Some((t, name)) => format!("({} OR {})", t, name),
            None => term.to_string(),
        };
        if seen.insert(expanded.to_lowercase()) {
            terms.push(expanded);
        }
    }

    if terms.is_empty() {
        query.to_string()
    } else {
        terms.join(" OR ")
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    #[serde(default)]
    source: Option<NewsApiSource>,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

/// Keyed provider for newsapi.org.
#[derive(Debug, Clone)]
pub struct NewsApiProvider {
    http: HttpClient,
    api_key: String,
    endpoint: String,
}

impl NewsApiProvider {
    pub fn new(http: HttpClient, api_key: &str) -> Self {
        Self::with_endpoint(http, api_key, NEWSAPI_ENDPOINT)
    }

    pub fn with_endpoint(http: HttpClient, api_key: &str, endpoint: &str) -> Self {
        Self {
            http,
            api_key: api_key.trim().to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn base_params(&self, limit: usize, options: &FetchOptions) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("pageSize", limit.min(MAX_PAGE_SIZE).to_string()),
            ("language", "en".to_string()),
            ("sortBy", "publishedAt".to_string()),
            ("apiKey", self.api_key.clone()),
        ];
        let optional = [
            ("from", &options.date_from),
            ("to", &options.date_to),
            ("domains", &options.domains),
            ("sources", &options.sources),
        ];
        for (name, value) in optional {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                params.push((name, v.to_string()));
            }
        }
        params
    }

    async fn call(&self, params: &[(&str, String)]) -> Result<Vec<RawArticle>, ProviderError> {
        let data: NewsApiResponse = self.http.get_json(&self.endpoint, params).await?;
        if data.status != "ok" {
            return Err(ProviderError::Upstream {
                provider: "NewsAPI",
                message: data.message.unwrap_or_else(|| "error".to_string()),
            });
        }
        Ok(project(data.articles))
    }
}

/// The three search passes, each a full parameter list.
fn search_passes(
    expanded: &str,
    base: &[(&'static str, String)],
) -> [Vec<(&'static str, String)>; 3] {
    let names_only: String = expanded.chars().filter(|c| !matches!(c, '(' | ')')).collect();
    let with_base = |mut params: Vec<(&'static str, String)>| {
        params.extend(base.iter().cloned());
        params
    };

    [
        with_base(vec![
            ("q", expanded.to_string()),
            ("searchIn", "title,description,content".to_string()),
        ]),
        with_base(vec![("qInTitle", names_only.clone())]),
        with_base(vec![("q", format!("{} OR {}", names_only, FINANCE_TERMS))]),
    ]
}

/// Convert API articles into raw items, skipping aggregators, blank titles and
/// repeated titles.
fn project(articles: Vec<NewsApiArticle>) -> Vec<RawArticle> {
    let mut seen_titles = HashSet::new();
    let mut items = Vec::new();

    for article in articles {
        let source = article
            .source
            .and_then(|s| s.name)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "NewsAPI".to_string());
        if AGGREGATOR_BLOCKLIST.contains(&source.trim().to_lowercase().as_str()) {
            continue;
        }

        let title = article.title.unwrap_or_default().trim().to_string();
        if title.is_empty() || !seen_titles.insert(title.to_lowercase()) {
            continue;
        }

        let description = article
            .description
            .filter(|d| !d.is_empty())
            .or(article.content)
            .unwrap_or_default();
        let published_at = article
            .published_at
            .and_then(|p| DateTime::parse_from_rfc3339(&p).ok())
            .map(|dt| dt.with_timezone(&Utc));

        items.push(RawArticle {
            title,
            url: article.url.unwrap_or_default(),
            description,
            published_at,
            source,
            image_url: article.url_to_image,
        });
    }

    items
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    fn name(&self) -> &'static str {
        "newsapi"
    }

    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        options: &FetchOptions,
    ) -> Result<Vec<RawArticle>, ProviderError> {
        if !self.has_key() {
            return Err(ProviderError::MissingApiKey);
        }

        let expanded = expand_query(query);
        let base = self.base_params(limit, options);
        let passes = search_passes(&expanded, &base);
        let last = passes.len() - 1;

        for (i, params) in passes.iter().enumerate() {
            let mut items = self.call(params).await?;
            debug!("NewsAPI pass {} returned {} items", i + 1, items.len());
            if !items.is_empty() || i == last {
                items.truncate(limit);
                return Ok(items);
            }
        }

        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::{extract::Query, routing::get, Json, Router};
    use serde_json::json;

    fn param<'a>(params: &'a [(&str, String)], name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_expand_query() {
        assert_eq!(expand_query("AAPL"), "(AAPL OR Apple)");
        assert_eq!(expand_query("aapl, msft"), "(AAPL OR Apple) OR (MSFT OR Microsoft)");
        assert_eq!(
            expand_query("NVDA or chips OR $NVDA"),
            "(NVDA OR Nvidia) OR chips"
        );
        assert_eq!(expand_query("Apple Inc"), "Apple Inc");
        assert_eq!(expand_query("Fed, fed"), "Fed");
        assert_eq!(expand_query(" , "), " , ");
        assert_eq!(expand_query("ORACLE"), "ORACLE");
    }

    #[test]
    fn test_passes() {
        let base = vec![("apiKey", "k".to_string())];
        let passes = search_passes("(IBM OR IBM) OR cloud", &base);

        assert_eq!(param(&passes[0], "q"), Some("(IBM OR IBM) OR cloud"));
        assert_eq!(param(&passes[0], "searchIn"), Some("title,description,content"));
        assert_eq!(param(&passes[1], "qInTitle"), Some("IBM OR IBM OR cloud"));
        assert_eq!(param(&passes[1], "q"), None);
        assert_eq!(
            param(&passes[2], "q"),
            Some("IBM OR IBM OR cloud OR (earnings OR guidance OR upgrade OR downgrade OR outlook)")
        );
        assert!(passes.iter().all(|p| param(p, "apiKey") == Some("k")));
    }

    #[test]
    fn test_base_params() {
        let http = HttpClient::new("t", Duration::from_secs(1)).unwrap();
        let provider = NewsApiProvider::new(http, " key ");
        let options = FetchOptions {
            date_from: Some("2024-01-01".to_string()),
            date_to: None,
            domains: Some("  ".to_string()),
            sources: Some("reuters".to_string()),
        };
        let params = provider.base_params(80, &options);
        assert_eq!(param(&params, "pageSize"), Some("50"));
        assert_eq!(param(&params, "apiKey"), Some("key"));
        assert_eq!(param(&params, "from"), Some("2024-01-01"));
        assert_eq!(param(&params, "to"), None);
        assert_eq!(param(&params, "domains"), None);
        assert_eq!(param(&params, "sources"), Some("reuters"));
    }

    #[test]
    fn test_project() {
        let data: NewsApiResponse = serde_json::from_value(json!({
            "status": "ok",
            "articles": [
                {
                    "source": {"name": "Reuters"},
                    "title": "  Apple beats  ",
                    "description": "",
                    "content": "Body from content",
                    "url": "https://r.test/1",
                    "urlToImage": "https://r.test/1.png",
                    "publishedAt": "2024-05-01T12:30:00Z"
                },
                {"source": {"name": "BizToc.com"}, "title": "Aggregated"},
                {"source": {"name": "CNBC"}, "title": "APPLE BEATS"},
                {"source": {"name": "CNBC"}, "title": "   "},
                {"source": null, "title": "No source", "publishedAt": "yesterday"}
            ]
        }))
        .unwrap();

        let items = project(data.articles);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Apple beats");
        assert_eq!(items[0].description, "Body from content");
        assert_eq!(items[0].image_url.as_deref(), Some("https://r.test/1.png"));
        assert_eq!(
            items[0].published_at.map(|d| d.to_rfc3339()),
            Some("2024-05-01T12:30:00+00:00".to_string())
        );
        assert_eq!(items[1].source, "NewsAPI");
        assert_eq!(items[1].url, "");
        assert_eq!(items[1].published_at, None);
    }

    async fn spawn_api(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v2/everything", addr)
    }

    fn provider(endpoint: &str, key: &str) -> NewsApiProvider {
        let http = HttpClient::new("finnews-test", Duration::from_secs(5)).unwrap();
        NewsApiProvider::with_endpoint(http, key, endpoint)
    }

    #[tokio::test]
    async fn test_missing_key() {
        let p = provider("http://127.0.0.1:9/never", "  ");
        let err = p.fetch("AAPL", 5, &FetchOptions::default()).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_falls_through_to_title_pass() {
        let app = Router::new().route(
            "/v2/everything",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let articles = if params.contains_key("qInTitle") {
                    json!([
                        {"source": {"name": "Reuters"}, "title": "Apple one", "url": "https://r.test/1"},
                        {"source": {"name": "Reuters"}, "title": "Apple two", "url": "https://r.test/2"},
                        {"source": {"name": "Reuters"}, "title": "Apple three", "url": "https://r.test/3"}
                    ])
                } else {
                    json!([])
                };
                Json(json!({"status": "ok", "totalResults": 3, "articles": articles}))
            }),
        );
        let endpoint = spawn_api(app).await;

        let items = provider(&endpoint, "key")
            .fetch("AAPL", 2, &FetchOptions::default())
            .await
            .unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple one", "Apple two"]);
    }

    #[tokio::test]
    async fn test_all_passes_empty() {
        let app = Router::new().route(
            "/v2/everything",
            get(|| async { Json(json!({"status": "ok", "articles": []})) }),
        );
        let endpoint = spawn_api(app).await;

        let items = provider(&endpoint, "key")
            .fetch("obscure", 5, &FetchOptions::default())
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_envelope() {
        let app = Router::new().route(
            "/v2/everything",
            get(|| async {
                (
                    axum::http::StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "status": "error",
                        "code": "apiKeyInvalid",
                        "message": "Your API key is invalid."
                    })),
                )
            }),
        );
        let endpoint = spawn_api(app).await;

        let err = provider(&endpoint, "bad")
            .fetch("AAPL", 5, &FetchOptions::default())
            .await
            .unwrap_err();
        match err {
            ProviderError::Upstream { provider, message } => {
                assert_eq!(provider, "NewsAPI");
                assert_eq!(message, "Your API key is invalid.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
