//! Health, diagnostics and metrics endpoints.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::extract::rejection::QueryRejection;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::super::error::ApiError;
use super::super::metrics::PROMETHEUS_CONTENT_TYPE;
use super::super::AppState;
use super::{bounded, clean_date};
use crate::models::ProviderKind;
use crate::providers::{FetchOptions, NewsProvider};
use crate::rate_limit::{client_key, pick_client_ip};

/// Query used to probe whether a source or domain returns anything.
const PROBE_QUERY: &str = "stocks OR earnings";

fn peer(connect_info: Option<ConnectInfo<SocketAddr>>) -> Option<SocketAddr> {
    connect_info.map(|ConnectInfo(addr)| addr)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "time": Utc::now().to_rfc3339() }))
}

/// Configuration summary.
pub async fn diag(State(state): State<AppState>) -> impl IntoResponse {
    let providers: Vec<&str> = ProviderKind::ALL.iter().map(|p| p.as_str()).collect();
    Json(json!({
        "newsapi_key_set": state.settings.has_newsapi_key(),
        "allowed_origins": state.settings.allowed_origins,
        "providers": providers,
        "db_enabled": state.saved.is_some(),
        "event_log": state.event_log.is_some(),
        "rate_limit": state.settings.rate_limit.to_string(),
        "rate_limit_backend": state.limiter.backend_name(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// The client IP the server sees and how it was chosen.
pub async fn whoami(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let peer = peer(connect_info);
    let client = pick_client_ip(&headers, peer);
    Json(json!({
        "chosen_ip": client.ip,
        "source": client.source,
        "headers_seen": {
            "x-forwarded-for": client.forwarded_for,
            "x-real-ip": client.real_ip,
        },
        "peer": peer.map(|addr| addr.ip().to_string()),
        "limiter_key": client_key(&headers, peer),
    }))
}

/// Raw addressing headers next to the chosen IP and limiter key.
pub async fn diag_addr(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let peer = peer(connect_info);
    let client = pick_client_ip(&headers, peer);
    Json(json!({
        "client": peer.map(|addr| addr.ip().to_string()),
        "x_forwarded_for": header_str(&headers, "x-forwarded-for"),
        "x_real_ip": header_str(&headers, "x-real-ip"),
        "forwarded": header_str(&headers, "forwarded"),
        "cf_connecting_ip": header_str(&headers, "cf-connecting-ip"),
        "chosen_ip": client.ip,
        "source": client.source,
        "limiter_key": client_key(&headers, peer),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DiagSourcesParams {
    /// Comma-separated NewsAPI source ids or domains.
    pub items: String,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: Option<usize>,
}

/// Probe NewsAPI with each item, first as a source id, then as a domain.
pub async fn diag_sources(
    State(state): State<AppState>,
    params: Result<Query<DiagSourcesParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let limit = bounded("limit", params.limit, 1, 1, 3)?;

    if !state.newsapi.has_key() {
        return Err(ApiError::BadRequest("NEWSAPI_KEY not set.".to_string()));
    }
    let base = FetchOptions {
        date_from: clean_date(params.date_from.as_deref())?,
        date_to: clean_date(params.date_to.as_deref())?,
        ..Default::default()
    };

    let tested: Vec<String> = params
        .items
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let mut results = BTreeMap::new();
    for item in &tested {
        let as_source = base.clone().with_sources(item.as_str());
        let count = match state.newsapi.fetch(PROBE_QUERY, limit, &as_source).await {
            Ok(found) => found.len(),
            Err(e) => {
                debug!("{} is not a usable source id: {}", item, e);
                let as_domain = base.clone().with_domains(item.as_str());
                state
                    .newsapi
                    .fetch(PROBE_QUERY, limit, &as_domain)
                    .await
                    .map(|found| found.len())
                    .unwrap_or(0)
            }
        };
        results.insert(item.clone(), count);
    }

    Ok(Json(json!({ "tested": tested, "results": results })))
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render(),
    )
}
