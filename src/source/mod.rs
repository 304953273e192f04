//! Page retrieval layer
//! - fetcher.rs: PageFetcher trait
//! - http.rs: reqwest implementation
//! - retry.rs: backoff policy and Retry-After handling

pub mod fetcher;
pub mod http;
pub mod retry;

pub use fetcher::PageFetcher;
pub use http::HttpFetcher;
pub use retry::RetryPolicy;
