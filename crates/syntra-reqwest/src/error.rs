//! Internal error types for syntra-reqwest.

use syntra_core::ApiError;
use thiserror::Error;

/// Result type alias for syntra-reqwest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Internal error type for syntra-reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Request URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    ApiError::transport("request timed out")
                } else if e.is_connect() {
                    ApiError::transport("connection failed")
                } else {
                    ApiError::transport(e.to_string())
                }
            }
            Error::Url(e) => ApiError::transport(format!("invalid request url: {e}")),
        }
    }
}
