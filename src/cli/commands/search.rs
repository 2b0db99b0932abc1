//! Search command: one search printed as JSON.

use console::style;

use crate::config::Settings;
use crate::models::{ProviderKind, SearchResponse};
use crate::providers::{FetchOptions, HttpClient, NewsApiProvider, NewsProvider, RssProvider};
use crate::services::build_articles;

pub async fn cmd_search(
    settings: &Settings,
    query: &str,
    provider: ProviderKind,
    limit: usize,
    sentences: usize,
) -> anyhow::Result<()> {
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("Query must not be empty");
    }

    let http = HttpClient::new(&settings.user_agent, settings.request_timeout())?;
    let upstream: Box<dyn NewsProvider> = match provider {
        ProviderKind::Rss => Box::new(RssProvider::new(http)),
        ProviderKind::Newsapi => Box::new(NewsApiProvider::new(http, &settings.newsapi_key)),
    };

    let raw = upstream
        .fetch(query, limit.clamp(1, 50), &FetchOptions::default())
        .await?;
    let response = SearchResponse::new(query, provider, build_articles(raw, sentences.max(1)));

    if response.count == 0 {
        eprintln!("{} No articles found", style("!").yellow());
    }
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
