//! TriMet error types

use thiserror::Error;

use crate::time::TimeParseError;

/// Errors that can occur while talking to the TriMet web services
#[derive(Debug, Error)]
pub enum TrimetError {
    /// Connection to the TriMet service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP request could not be built or sent
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to decode the response body
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Request parameters were rejected before any network I/O
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The service answered with an error
    ///
    /// Raised for non-2xx statuses and for result sets carrying an
    /// `errorMessage`, which the service also sends with status 200.
    #[error("{method} {url}: {status} {message}")]
    Api {
        /// HTTP method of the failed request
        method: String,
        /// Request URL without its query string
        url: String,
        /// HTTP status code
        status: u16,
        /// Content of the service's `errorMessage`, empty if none was sent
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying (if provided by the service)
        retry_after_secs: Option<u64>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// A timestamp could not be interpreted
    #[error(transparent)]
    Time(#[from] TimeParseError),
}

impl TrimetError {
    /// Returns true if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionFailed(_) | Self::Timeout { .. } | Self::RateLimitExceeded { .. } => {
                true
            },
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Content of the service error message, if this is an API error
    #[must_use]
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}
