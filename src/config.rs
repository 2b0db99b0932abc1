//! Configuration management for finnews.
//!
//! Settings start from defaults, are overlaid by an optional TOML file, and
//! finally by environment variables (including a `.env` file loaded at
//! startup).

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::events::{DEFAULT_RING_KEY, DEFAULT_RING_MAX};
use crate::providers::USER_AGENT;
use crate::rate_limit::Quota;

/// Origin allowed by default (local frontend dev server).
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Default upstream request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 12;

/// Application settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// CORS origins. Empty allows any origin.
    pub allowed_origins: Vec<String>,
    /// NewsAPI key. Empty disables the newsapi provider.
    pub newsapi_key: String,
    /// Default per-client quota.
    pub rate_limit: Quota,
    /// Add hardening headers to every response.
    pub security_headers: bool,
    /// Reject requests whose Content-Length exceeds this (0 = unlimited).
    pub max_body_bytes: u64,
    /// SQLite URL or path for saved searches.
    pub database_url: Option<String>,
    /// Redis URL for shared rate limit counters and the event ring.
    pub redis_url: Option<String>,
    /// Record search events.
    pub event_log: bool,
    /// Length of the recent events ring.
    pub event_log_max: usize,
    /// Redis list key for the shared event ring.
    pub event_ring_key: String,
    /// Upstream request timeout in seconds.
    pub request_timeout: u64,
    /// User agent for upstream requests.
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            newsapi_key: String::new(),
            rate_limit: Quota::default(),
            security_headers: false,
            max_body_bytes: 0,
            database_url: None,
            redis_url: None,
            event_log: true,
            event_log_max: DEFAULT_RING_MAX,
            event_ring_key: DEFAULT_RING_KEY.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Settings as written in a TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    allowed_origins: Option<Vec<String>>,
    newsapi_key: Option<String>,
    rate_limit: Option<String>,
    security_headers: Option<bool>,
    max_body_bytes: Option<u64>,
    database_url: Option<String>,
    redis_url: Option<String>,
    event_log: Option<bool>,
    event_log_max: Option<usize>,
    event_ring_key: Option<String>,
    request_timeout: Option<u64>,
    user_agent: Option<String>,
}

impl Settings {
    /// Load settings: defaults, then the TOML file (if given), then the
    /// process environment.
    pub async fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = Self::default();

        if let Some(path) = config_path {
            let contents = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            settings.apply_toml(&contents)?;
            debug!("Loaded config from {}", path.display());
        }

        settings.apply_env(|name| std::env::var(name).ok());
        Ok(settings)
    }

    /// Overlay values from a TOML document.
    pub fn apply_toml(&mut self, contents: &str) -> anyhow::Result<()> {
        let file: FileConfig =
            toml::from_str(contents).context("Failed to parse TOML config")?;

        if let Some(origins) = file.allowed_origins {
            self.allowed_origins = clean_origins(origins);
        }
        if let Some(key) = file.newsapi_key {
            self.newsapi_key = key.trim().to_string();
        }
        if let Some(rate) = file.rate_limit {
            self.rate_limit = rate
                .parse()
                .with_context(|| format!("Invalid rate_limit in config: {}", rate))?;
        }
        if let Some(v) = file.security_headers {
            self.security_headers = v;
        }
        if let Some(v) = file.max_body_bytes {
            self.max_body_bytes = v;
        }
        if let Some(url) = file.database_url.filter(|s| !s.is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(url) = file.redis_url.filter(|s| !s.is_empty()) {
            self.redis_url = Some(url);
        }
        if let Some(v) = file.event_log {
            self.event_log = v;
        }
        if let Some(v) = file.event_log_max {
            self.event_log_max = v.max(1);
        }
        if let Some(key) = file.event_ring_key.filter(|s| !s.is_empty()) {
            self.event_ring_key = key;
        }
        if let Some(v) = file.request_timeout {
            self.request_timeout = v.max(1);
        }
        if let Some(ua) = file.user_agent.filter(|s| !s.is_empty()) {
            self.user_agent = ua;
        }
        Ok(())
    }

    /// Overlay values from environment variables read through `get`.
    ///
    /// Malformed values are logged and ignored.
    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(origins) = get("ALLOWED_ORIGINS") {
            self.allowed_origins =
                clean_origins(origins.split(',').map(str::to_string).collect());
        }
        if let Some(key) = get("NEWSAPI_KEY") {
            self.newsapi_key = key.trim().to_string();
        }
        if let Some(rate) = non_empty(get("RATE_LIMIT")) {
            match rate.parse() {
                Ok(quota) => self.rate_limit = quota,
                Err(e) => warn!("Ignoring RATE_LIMIT={}: {}", rate, e),
            }
        }
        if let Some(v) = non_empty(get("SECURITY_HEADERS")) {
            self.security_headers = parse_flag(&v);
        }
        if let Some(v) = parse_env_number("MAX_BODY_BYTES", &get) {
            self.max_body_bytes = v;
        }
        if let Some(url) = non_empty(get("DATABASE_URL")) {
            debug!("Using DATABASE_URL from environment: {}", url);
            self.database_url = Some(url);
        }
        if let Some(url) = non_empty(get("REDIS_URL")) {
            self.redis_url = Some(url);
        }
        if let Some(v) = non_empty(get("EVENT_LOG")) {
            self.event_log = parse_flag(&v);
        }
        if let Some(v) = parse_env_number("EVENT_LOG_MAX", &get) {
            self.event_log_max = (v as usize).max(1);
        }
        if let Some(key) = non_empty(get("EVENT_RING_KEY")) {
            self.event_ring_key = key;
        }
        if let Some(v) = parse_env_number("REQUEST_TIMEOUT", &get) {
            self.request_timeout = v.max(1);
        }
        if let Some(ua) = non_empty(get("USER_AGENT")) {
            self.user_agent = ua;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn has_newsapi_key(&self) -> bool {
        !self.newsapi_key.is_empty()
    }

    pub fn has_database(&self) -> bool {
        self.database_url.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_env_number(name: &str, get: &impl Fn(&str) -> Option<String>) -> Option<u64> {
    let raw = non_empty(get(name))?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={}: not a non-negative integer", name, raw);
            None
        }
    }
}

fn clean_origins(origins: Vec<String>) -> Vec<String> {
    origins
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}
