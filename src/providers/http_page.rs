use crate::core::page::PageFetcher;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, instrument};

const USER_AGENT: &str = concat!("meralco-api/", env!("CARGO_PKG_VERSION"));

/// Fetches announcement pages over plain HTTP.
pub struct HttpPageFetcher {
    client: reqwest::Client,
    timeout: Duration,
    precheck: bool,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration, precheck: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            timeout,
            precheck,
        })
    }

    /// Cheap HEAD probe. Only a definite "gone" answer rejects the page; servers
    /// that do not support HEAD fall through to the full download.
    async fn probe(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                Err(anyhow!("HTTP error: {} for URL: {}", response.status(), url))
            }
            status => {
                debug!(%status, "Probe passed");
                Ok(())
            }
        }
    }

    async fn download(&self, url: &str) -> Result<String> {
        if self.precheck {
            self.probe(url).await?;
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for URL: {}", response.status(), url));
        }

        let body = response
            .text()
            .await
            .context("Failed to get response text")?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    /// The probe and the download share one timeout budget.
    #[instrument(skip(self))]
    async fn fetch_page(&self, url: &str) -> Result<String> {
        tokio::time::timeout(self.timeout, self.download(url))
            .await
            .map_err(|_| anyhow!("Timed out after {:?} for URL: {}", self.timeout, url))?
    }
}
