//! Session credential seam.
//!
//! Session lifecycle (login, refresh, expiry) is owned by an external
//! collaborator; gateways only ask for the current bearer token.

use std::sync::Arc;

use crate::error::ApiResult;

/// Source of the bearer credential attached to every backend call.
#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    /// Returns the current bearer token.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when no usable session exists, which fails
    /// the request before it is sent.
    ///
    /// [`ApiError`]: crate::ApiError
    async fn bearer_token(&self) -> ApiResult<String>;
}

/// Fixed-token session for tests and one-off tooling.
#[derive(Debug, Clone)]
pub struct StaticSession {
    token: String,
}

impl StaticSession {
    /// Creates a session that always returns the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Wraps the session in an [`Arc`] trait object for injection.
    pub fn into_provider(self) -> Arc<dyn SessionProvider> {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl SessionProvider for StaticSession {
    async fn bearer_token(&self) -> ApiResult<String> {
        Ok(self.token.clone())
    }
}
