//! Retry policy for page fetches

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::FetchConfig;

/// When and how long to wait before re-sending a request
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// First wait; doubles on each further attempt
    pub backoff_factor: Duration,
    pub max_backoff: Duration,
    pub retry_on_status: Vec<u16>,
    /// Use the server's `Retry-After` hint instead of the computed backoff
    pub respect_retry_after: bool,
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::from(&FetchConfig::default())
        }
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_factor: Duration::from_millis(config.backoff_factor_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            retry_on_status: config.retry_on_status.clone(),
            respect_retry_after: config.respect_retry_after,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    Retry(Duration),
    DontRetry,
}

/// Attempt counter for one request
#[derive(Debug, Clone)]
pub struct RetryState<'a> {
    pub attempts: u32,
    policy: &'a RetryPolicy,
}

impl<'a> RetryState<'a> {
    pub fn new(policy: &'a RetryPolicy) -> Self {
        Self {
            attempts: 0,
            policy,
        }
    }

    /// Connection and timeout errors are always retryable
    pub fn should_retry_error(&mut self) -> RetryDecision {
        self.decide_retry(None)
    }

    pub fn should_retry_status(
        &mut self,
        status: u16,
        retry_after: Option<Duration>,
    ) -> RetryDecision {
        if !self.policy.retry_on_status.contains(&status) {
            return RetryDecision::DontRetry;
        }
        self.decide_retry(retry_after)
    }

    fn decide_retry(&mut self, retry_after: Option<Duration>) -> RetryDecision {
        self.attempts += 1;
        if self.attempts > self.policy.max_retries {
            return RetryDecision::DontRetry;
        }

        let backoff = self.backoff(self.attempts);
        let wait = match retry_after {
            Some(hint) if self.policy.respect_retry_after => hint.min(self.policy.max_backoff),
            _ => backoff,
        };

        RetryDecision::Retry(wait)
    }

    /// `factor * 2^(attempt - 1)`, capped
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.policy
            .backoff_factor
            .saturating_mul(1u32 << exponent)
            .min(self.policy.max_backoff)
    }
}

/// Parse a `Retry-After` header: delta seconds or an HTTP-date
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}
