//! News search endpoint.

use std::net::SocketAddr;

use axum::extract::rejection::QueryRejection;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use super::super::error::ApiError;
use super::super::AppState;
use super::{bounded, clean_date, non_blank};
use crate::events::SearchEvent;
use crate::models::{ProviderKind, SearchResponse};
use crate::providers::FetchOptions;
use crate::rate_limit::pick_client_ip;
use crate::services::{build_articles, DEFAULT_MAX_SENTENCES};

/// Query parameters for `/api/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub limit: Option<usize>,
    #[serde(default)]
    pub provider: ProviderKind,
    pub summarize_sentences: Option<usize>,
    /// `YYYY-MM-DD`, newsapi only.
    pub date_from: Option<String>,
    /// `YYYY-MM-DD`, newsapi only.
    pub date_to: Option<String>,
    /// Comma-separated domains, newsapi only.
    pub domains: Option<String>,
    /// Comma-separated NewsAPI source ids, newsapi only.
    pub sources: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params?;

    if params.query.is_empty() {
        return Err(ApiError::Validation(
            "query must be at least 1 character".to_string(),
        ));
    }
    let limit = bounded("limit", params.limit, 10, 1, 50)?;
    let sentences = bounded(
        "summarize_sentences",
        params.summarize_sentences,
        DEFAULT_MAX_SENTENCES,
        1,
        6,
    )?;
    let date_from = clean_date(params.date_from.as_deref())?;
    let date_to = clean_date(params.date_to.as_deref())?;

    let options = match params.provider {
        ProviderKind::Rss => FetchOptions::default(),
        ProviderKind::Newsapi => FetchOptions {
            date_from,
            date_to,
            domains: non_blank(params.domains),
            sources: non_blank(params.sources),
        },
    };

    let provider = state.provider(params.provider);
    let raw = match provider.fetch(&params.query, limit, &options).await {
        Ok(raw) => raw,
        Err(e) => {
            state.metrics.record_search_failure(params.provider);
            return Err(e.into());
        }
    };

    let articles = build_articles(raw, sentences);
    info!(
        "Search '{}' via {} returned {} articles",
        params.query,
        params.provider,
        articles.len()
    );
    state.metrics.record_search(params.provider, articles.len());

    if let Some(log) = state.event_log.clone() {
        let ip = pick_client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr)).ip;
        let event = SearchEvent::new(&params.query, limit, params.provider, articles.len(), &ip);
        let metrics = state.metrics.clone();
        tokio::spawn(async move {
            match log.record_search(&event).await {
                Ok(_) => metrics.record_event(),
                Err(e) => warn!("Failed to record search event: {}", e),
            }
        });
    }

    Ok(Json(SearchResponse::new(
        params.query,
        params.provider,
        articles,
    )))
}
