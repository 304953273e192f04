//! Fetcher trait for retrieving source pages

#[cfg(test)]
use mockall::automock;

use crate::version::error::FetchError;

/// Trait for fetching the raw markup of a source page
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the page body
    ///
    /// # Returns
    /// * `Ok(String)` - Response body of a successful request
    /// * `Err(FetchError)` - Network failure or non-success status after retries
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}
