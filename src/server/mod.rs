//! HTTP API server.
//!
//! Serves news search with summaries and sentiment, diagnostics, saved
//! searches (when a database is configured), the recent event log and
//! Prometheus metrics. Every request passes through the per-client rate
//! limiter.

mod error;
mod handlers;
mod metrics;
mod middleware;
mod routes;

pub use error::ApiError;
pub use metrics::Metrics;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Settings;
use crate::events::EventLog;
use crate::models::ProviderKind;
use crate::providers::{HttpClient, NewsApiProvider, NewsProvider, RssProvider};
use crate::rate_limit::{create_backend, RateLimiter};
use crate::repository::{init_schema, AsyncSqlitePool, DieselSavedSearchRepository};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub rss: Arc<RssProvider>,
    pub newsapi: Arc<NewsApiProvider>,
    pub limiter: RateLimiter,
    /// None when event logging is disabled.
    pub event_log: Option<Arc<EventLog>>,
    /// None when no database is configured or it could not be opened.
    pub saved: Option<Arc<DieselSavedSearchRepository>>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let http = HttpClient::new(&settings.user_agent, settings.request_timeout())?;
        let backend = create_backend(settings.redis_url.as_deref()).await;

        Ok(Self {
            settings: Arc::new(settings.clone()),
            rss: Arc::new(RssProvider::new(http.clone())),
            newsapi: Arc::new(NewsApiProvider::new(http, &settings.newsapi_key)),
            limiter: RateLimiter::new(backend, settings.rate_limit),
            event_log: create_event_log(settings).await,
            saved: open_saved_searches(settings).await,
            metrics: Arc::new(Metrics::new()),
        })
    }

    /// Provider answering searches of the given kind.
    pub fn provider(&self, kind: ProviderKind) -> &dyn NewsProvider {
        match kind {
            ProviderKind::Rss => self.rss.as_ref(),
            ProviderKind::Newsapi => self.newsapi.as_ref(),
        }
    }
}

async fn create_event_log(settings: &Settings) -> Option<Arc<EventLog>> {
    if !settings.event_log {
        return None;
    }

    #[allow(unused_mut)]
    let mut log = EventLog::new(settings.event_log_max);

    #[cfg(feature = "redis-backend")]
    if let Some(url) = settings.redis_url.as_deref() {
        match crate::events::RedisEventMirror::new(url, &settings.event_ring_key).await {
            Ok(mirror) => log = log.with_mirror(Arc::new(mirror)),
            Err(e) => warn!("Event ring mirror disabled: {}", e),
        }
    }

    Some(Arc::new(log))
}

async fn open_saved_searches(settings: &Settings) -> Option<Arc<DieselSavedSearchRepository>> {
    let url = settings.database_url.as_deref()?;
    let pool = AsyncSqlitePool::new(url);
    match init_schema(&pool).await {
        Ok(()) => Some(Arc::new(DieselSavedSearchRepository::new(pool))),
        Err(e) => {
            warn!("Saved search API disabled, database unavailable: {}", e);
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
