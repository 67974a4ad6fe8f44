//! Exchange adapter error types
//!
//! All exchange-related errors are wrapped in ExchangeError enum
//! which implements thiserror for consistent error handling.

use thiserror::Error;

/// Exchange-specific error types for source operations
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// HTTP request could not be sent or the body could not be read
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Exchange answered with a non-success HTTP status
    #[error("HTTP {status} from {endpoint}")]
    HttpStatus { endpoint: String, status: u16 },

    /// Exchange answered with an application-level error code
    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    /// Fetch did not complete within the per-source deadline
    #[error("Network timeout after {0}ms")]
    NetworkTimeout(u64),

    /// Invalid or unexpected response from exchange
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Source name not known to the factory
    #[error("Unknown exchange source: {0}")]
    UnknownSource(String),
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::RequestFailed(format!("timed out: {}", err))
        } else {
            ExchangeError::RequestFailed(err.to_string())
        }
    }
}

/// Result type alias for exchange operations
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;
