//! Fetcher test utilities

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use oneview_watch::config::{FeedConfig, FetchConfig, SourceConfig, StateConfig, WatchConfig};
use oneview_watch::source::PageFetcher;
use oneview_watch::version::error::FetchError;

/// Fetcher serving canned pages; unknown URLs fail with 503
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(html) => Ok(html.clone()),
            None => Err(FetchError::Status {
                status: 503,
                url: url.to_string(),
            }),
        }
    }
}

/// Configuration writing into a temporary directory, with no failure delay
pub fn test_config(sources: Vec<SourceConfig>) -> (TempDir, WatchConfig) {
    let temp_dir = TempDir::new().unwrap();
    let config = WatchConfig {
        sources,
        fetch: FetchConfig {
            failure_delay_ms: 0,
            ..FetchConfig::default()
        },
        state: StateConfig {
            path: temp_dir.path().join("latest_oneview.txt"),
        },
        feed: FeedConfig {
            path: temp_dir.path().join("oneview.xml"),
            ..FeedConfig::default()
        },
        ..WatchConfig::default()
    };
    (temp_dir, config)
}
