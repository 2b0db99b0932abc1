//! Process-local counters exposed in Prometheus text format.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::http::StatusCode;

use crate::models::ProviderKind;

/// Content type of the text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const STATUS_CLASSES: [&str; 5] = ["1xx", "2xx", "3xx", "4xx", "5xx"];

/// Request, search, rate limit and event counters.
#[derive(Debug, Default)]
pub struct Metrics {
    http_responses: [AtomicU64; 5],
    rate_limited: AtomicU64,
    searches: [AtomicU64; 2],
    search_failures: [AtomicU64; 2],
    articles_returned: AtomicU64,
    events_recorded: AtomicU64,
}

fn provider_index(provider: ProviderKind) -> usize {
    match provider {
        ProviderKind::Rss => 0,
        ProviderKind::Newsapi => 1,
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_response(&self, status: StatusCode) {
        let class = (status.as_u16() / 100).clamp(1, 5) as usize - 1;
        self.http_responses[class].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search(&self, provider: ProviderKind, articles: usize) {
        self.searches[provider_index(provider)].fetch_add(1, Ordering::Relaxed);
        self.articles_returned
            .fetch_add(articles as u64, Ordering::Relaxed);
    }

    pub fn record_search_failure(&self, provider: ProviderKind) {
        self.search_failures[provider_index(provider)].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event(&self) {
        self.events_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn searches(&self, provider: ProviderKind) -> u64 {
        self.searches[provider_index(provider)].load(Ordering::Relaxed)
    }

    pub fn rate_limited(&self) -> u64 {
        self.rate_limited.load(Ordering::Relaxed)
    }

    /// Render all counters.
    pub fn render(&self) -> String {
        let mut out = String::new();

        counter_header(&mut out, "finnews_http_responses_total", "HTTP responses by status class");
        for (class, count) in STATUS_CLASSES.iter().zip(&self.http_responses) {
            let _ = writeln!(
                out,
                "finnews_http_responses_total{{status=\"{}\"}} {}",
                class,
                count.load(Ordering::Relaxed)
            );
        }

        counter_header(&mut out, "finnews_rate_limited_total", "Requests rejected by the rate limiter");
        let _ = writeln!(out, "finnews_rate_limited_total {}", self.rate_limited());

        counter_header(&mut out, "finnews_searches_total", "Completed searches by provider");
        for provider in ProviderKind::ALL {
            let _ = writeln!(
                out,
                "finnews_searches_total{{provider=\"{}\"}} {}",
                provider,
                self.searches(provider)
            );
        }

        counter_header(&mut out, "finnews_search_failures_total", "Failed searches by provider");
        for provider in ProviderKind::ALL {
            let _ = writeln!(
                out,
                "finnews_search_failures_total{{provider=\"{}\"}} {}",
                provider,
                self.search_failures[provider_index(provider)].load(Ordering::Relaxed)
            );
        }

        counter_header(&mut out, "finnews_articles_returned_total", "Articles returned by searches");
        let _ = writeln!(
            out,
            "finnews_articles_returned_total {}",
            self.articles_returned.load(Ordering::Relaxed)
        );

        counter_header(&mut out, "finnews_events_recorded_total", "Events appended to the event log");
        let _ = writeln!(
            out,
            "finnews_events_recorded_total {}",
            self.events_recorded.load(Ordering::Relaxed)
        );

        out
    }
}

fn counter_header(out: &mut String, name: &str, help: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} counter", name);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_counts() {
        let metrics = Metrics::new();
        metrics.record_response(StatusCode::OK);
        metrics.record_response(StatusCode::OK);
        metrics.record_response(StatusCode::TOO_MANY_REQUESTS);
        metrics.record_rate_limited();
        metrics.record_search(ProviderKind::Rss, 4);
        metrics.record_search_failure(ProviderKind::Newsapi);
        metrics.record_event();

        let text = metrics.render();
        assert!(text.contains("# TYPE finnews_http_responses_total counter"));
        assert!(text.contains("finnews_http_responses_total{status=\"2xx\"} 2"));
        assert!(text.contains("finnews_http_responses_total{status=\"4xx\"} 1"));
        assert!(text.contains("finnews_rate_limited_total 1"));
        assert!(text.contains("finnews_searches_total{provider=\"rss\"} 1"));
        assert!(text.contains("finnews_searches_total{provider=\"newsapi\"} 0"));
        assert!(text.contains("finnews_search_failures_total{provider=\"newsapi\"} 1"));
        assert!(text.contains("finnews_articles_returned_total 4"));
        assert!(text.contains("finnews_events_recorded_total 1"));
    }
}
