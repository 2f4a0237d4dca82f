//! HTTP content fetcher for reference pages.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::sanitize::{html_to_text, truncate_chars};
use super::ResearchFetcher;
use crate::config::FetchConfig;
use crate::domain::ResearchItem;

/// Per-URL fetch failure. Always converted into an inline marker.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("cannot read response body: {0}")]
    Body(String),
}

/// Fetches pages with a browser identity and a fixed timeout, then strips
/// markup and truncates.
pub struct HttpFetcher {
    http_client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http_client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            http_client,
            config,
        })
    }

    async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let html = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.config.timeout_secs)
            } else {
                FetchError::Body(e.to_string())
            }
        })?;

        let text = html_to_text(&html);
        Ok(truncate_chars(&text, self.config.max_chars).to_string())
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.config.timeout_secs)
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ResearchFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> ResearchItem {
        debug!(url = %url, "fetching reference");
        match self.try_fetch(url).await {
            Ok(text) => ResearchItem::fetched(url, text),
            Err(e) => {
                warn!(url = %url, error = %e, "reference fetch failed");
                ResearchItem::failed(url, e)
            }
        }
    }
}
