//! HTTP page fetcher with retry and backoff

use std::time::Duration;

use chrono::Utc;
use reqwest::StatusCode;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA, RETRY_AFTER,
};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::source::fetcher::PageFetcher;
use crate::source::retry::{RetryDecision, RetryPolicy, RetryState, parse_retry_after};
use crate::version::error::FetchError;

/// Some vendor pages refuse clients that do not look like a browser
const USER_AGENT: &str = "Mozilla/5.0 (OneViewChecker; +https://github.com/) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122 Safari/537.36";

/// Fetcher backed by `reqwest`
pub struct HttpFetcher {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(default_headers())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            policy: RetryPolicy::from(config),
        })
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.7"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

fn status_error(status: StatusCode, url: &str, retry_after: Option<Duration>) -> FetchError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return FetchError::RateLimited {
            retry_after_secs: retry_after.map(|d| d.as_secs()),
        };
    }
    FetchError::Status {
        status: status.as_u16(),
        url: url.to_string(),
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let mut retry_state = RetryState::new(&self.policy);

        loop {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        debug!("Fetched {} ({})", url, status);
                        return response.text().await.map_err(|e| {
                            warn!("Failed to read response body from {}: {}", url, e);
                            FetchError::InvalidResponse(e.to_string())
                        });
                    }

                    let retry_after = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| parse_retry_after(v, Utc::now()));

                    match retry_state.should_retry_status(status.as_u16(), retry_after) {
                        RetryDecision::Retry(delay) => {
                            warn!(
                                "{} returned {} (attempt {}), retrying after {:?}",
                                url, status, retry_state.attempts, delay
                            );
                            sleep(delay).await;
                        }
                        RetryDecision::DontRetry => {
                            warn!("{} returned status {}", url, status);
                            return Err(status_error(status, url, retry_after));
                        }
                    }
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    match retry_state.should_retry_error() {
                        RetryDecision::Retry(delay) => {
                            warn!(
                                "Request to {} failed (attempt {}), retrying after {:?}: {}",
                                url, retry_state.attempts, delay, e
                            );
                            sleep(delay).await;
                        }
                        RetryDecision::DontRetry => return Err(e.into()),
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
