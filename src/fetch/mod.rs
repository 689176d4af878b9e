//! Page fetching over HTTP.
//!
//! The pipeline only needs "give me the markup at this URL", so the fetcher
//! is a trait; tests swap in fixture fetchers and production uses
//! [`HttpFetcher`] on reqwest.

pub mod rate_limiter;

use crate::config::ScrapeConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;

/// Retrieves raw markup for a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Production fetcher: reqwest with a bounded timeout and an identifying
/// user agent. Retry/backoff is deliberately not implemented here; a request
/// that exhausts its timeout is reported like any other fetch failure and the
/// pipeline soft-fails that entity.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })
    }
}
