//! Error types for the feedbacks API client.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to the feedbacks API.
#[derive(Debug, Error)]
pub enum WbError {
    /// Transport-level failure (connection refused, timeout). Retryable.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Authentication rejected (401/403). Never retried.
    #[error("authentication failed: HTTP {status}")]
    Auth { status: u16 },

    /// Rate limited past the independent 429 retry cap.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// Response body was not the JSON the API promises.
    #[error("malformed response (HTTP {status}): {snippet}")]
    MalformedResponse { status: u16, snippet: String },

    /// All attempts consumed; carries the last error's description.
    #[error("request failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}
