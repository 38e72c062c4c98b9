//! API error value shared across syntra crates.

use serde::{Deserialize, Serialize};

/// Type alias for Results carrying an [`ApiError`].
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Status code used when a request failed before any HTTP response arrived.
pub const STATUS_TRANSPORT: u16 = 0;

/// Application-level error returned by the backend or synthesized at the
/// gateway boundary.
///
/// Every expected failure mode (transport failure, non-2xx status,
/// application error payload on a 2xx body, malformed body) normalizes into
/// this one value. It crosses the core boundary in `Err` position only;
/// the core never sees a raw transport exception.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status code, or [`STATUS_TRANSPORT`] if the request never
    /// produced a response.
    pub status_code: u16,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured error details from the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Creates a new error with the given status code and message.
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            details: None,
        }
    }

    /// Creates a transport-level error (network failure, timeout).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(STATUS_TRANSPORT, message)
    }

    /// Creates an error from a non-2xx HTTP response.
    pub fn http(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(status_code, message)
    }

    /// Creates an error from an application-level error payload carried on a
    /// 2xx response body.
    pub fn application(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(status_code, message)
    }

    /// Creates an error for a response body that could not be interpreted.
    pub fn malformed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(STATUS_TRANSPORT, format!("malformed response: {message}"))
    }

    /// Creates an error for a request payload rejected before it was sent.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    /// Attaches structured details to this error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Returns whether the request failed before reaching the backend.
    pub fn is_transport(&self) -> bool {
        self.status_code == STATUS_TRANSPORT
    }

    /// Returns whether the error is worth retrying (transport failures,
    /// server errors, timeouts, throttling).
    pub fn is_retryable(&self) -> bool {
        self.status_code == STATUS_TRANSPORT
            || self.status_code >= 500
            || self.status_code == 408
            || self.status_code == 429
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_transport() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} (status {})", self.message, self.status_code)
        }
    }
}

impl std::error::Error for ApiError {}
