//! Shared HTTP client for upstream providers.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::ProviderError;

/// Default User-Agent sent upstream.
pub const USER_AGENT: &str = "FinNewsSummarizer/1.0";

/// Thin wrapper over a pooled reqwest client with a fixed User-Agent and timeout.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let user_agent = if user_agent.trim().is_empty() {
            USER_AGENT
        } else {
            user_agent
        };
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }

    /// GET a URL and return the body, failing on non-2xx status.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    /// GET a URL with query parameters and decode the JSON body.
    ///
    /// Error statuses whose body still decodes as `T` are returned as data;
    /// callers inspect the envelope's own status field.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        debug!("GET {} ({} params)", url, params.len());
        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<T>(&body) {
            Ok(value) => Ok(value),
            Err(e) if status.is_success() => Err(ProviderError::Parse(e.to_string())),
            Err(_) => Err(ProviderError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}
