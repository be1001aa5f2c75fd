//! Page retrieval abstraction

use anyhow::Result;
use async_trait::async_trait;

/// Retrieves the HTML of an announcement page.
///
/// Any failure, including a timeout, is reported as `Err`; callers treat it as
/// "this candidate is not available".
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String>;
}
