//! Turns provider results into summarized, scored articles.

use super::sentiment::quick_sentiment;
use super::summarizer::summarize;
use crate::models::{Article, RawArticle};

/// Placeholder URL for items that arrive without a link.
pub const FALLBACK_URL: &str = "https://example.com";
/// Source label for items that arrive without one.
pub const FALLBACK_SOURCE: &str = "Unknown";

/// Summarize and score one raw item.
pub fn build_article(raw: RawArticle, max_sentences: usize) -> Article {
    let summary = if raw.description.is_empty() {
        String::new()
    } else {
        summarize(&raw.description, max_sentences)
    };
    let sentiment = quick_sentiment(&format!("{} {}", raw.title, summary));

    Article {
        title: raw.title.trim().to_string(),
        url: if raw.url.is_empty() {
            FALLBACK_URL.to_string()
        } else {
            raw.url
        },
        source: if raw.source.is_empty() {
            FALLBACK_SOURCE.to_string()
        } else {
            raw.source
        },
        published_at: raw.published_at,
        summary,
        sentiment: Some(sentiment),
        image_url: raw.image_url,
    }
}

/// Summarize and score every raw item, preserving provider order.
pub fn build_articles(raw: Vec<RawArticle>, max_sentences: usize) -> Vec<Article> {
    raw.into_iter()
        .map(|item| build_article(item, max_sentences))
        .collect()
}
