//! Configuration types for the feedbacks API client.

use std::time::Duration;

/// Production base URL of the Wildberries feedbacks API.
pub const DEFAULT_BASE_URL: &str = "https://feedbacks-api.wildberries.ru/api/v1";

/// Configuration for the feedbacks API client.
#[derive(Debug, Clone)]
pub struct WbConfig {
    /// Base URL of the feedbacks API.
    pub base_url: String,
    /// Per-request timeout. Exceeding it counts as a retryable transport error.
    pub timeout: Duration,
    /// Retry behavior for the request primitive.
    pub retry: RetryConfig,
}

impl WbConfig {
    /// Create a configuration with a custom base URL (e.g., a test server).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Get the feedbacks listing endpoint URL.
    pub fn feedbacks_url(&self) -> String {
        format!("{}/feedbacks", self.base_url)
    }

    /// Get the reply endpoint URL for a feedback id.
    pub fn reply_url(&self, feedback_id: &str) -> String {
        format!("{}/feedbacks/{}/reply", self.base_url, feedback_id)
    }
}

impl Default for WbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

/// Retry behavior for a single API request.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum attempts for retryable failures (transport errors, 5xx).
    pub max_attempts: u32,
    /// Base delay for exponential backoff; attempt `n` waits `base * 2^n`.
    pub backoff_base: Duration,
    /// Delay applied on HTTP 429 when the server gives no Retry-After.
    pub rate_limit_delay: Duration,
    /// Cap on consecutive 429 retries, which do not consume attempts.
    pub max_rate_limit_retries: u32,
}

impl RetryConfig {
    /// Calculate the backoff delay for a given attempt number.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_base * 2u32.saturating_pow(attempt)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            rate_limit_delay: Duration::from_secs(5),
            max_rate_limit_retries: 5,
        }
    }
}
