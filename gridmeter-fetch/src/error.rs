//! Fetch error types.

use thiserror::Error;

/// Error type for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded its timeout.
    #[error("request timed out")]
    Timeout,

    /// Rate limited by the provider.
    #[error("rate limited, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, if the provider said.
        retry_after: Option<u64>,
    },

    /// The request was rejected with 401/403. Callers use this to
    /// invalidate their session and re-authenticate.
    #[error("authorization rejected")]
    Unauthorized,

    /// Unexpected response status or shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    /// Maps a reqwest transport failure, surfacing timeouts distinctly.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Http(err)
        }
    }
}
