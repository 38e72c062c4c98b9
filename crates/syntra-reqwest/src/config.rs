//! Configuration for the reqwest gateway.

use std::time::Duration;

use url::Url;

/// Default timeout for backend requests: 30 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`ReqwestGateway`].
///
/// [`ReqwestGateway`]: crate::ReqwestGateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the backend API, including any path prefix.
    pub base_url: Url,
    /// Value sent as the `Origin` header on every request.
    pub origin: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User-Agent header to send with requests.
    pub user_agent: String,
}

impl GatewayConfig {
    /// Creates a configuration for the given base URL.
    ///
    /// The `Origin` header defaults to the base URL's origin.
    pub fn new(base_url: Url) -> Self {
        let origin = base_url.origin().ascii_serialization();
        Self {
            base_url,
            origin,
            timeout: DEFAULT_TIMEOUT,
            user_agent: Self::default_user_agent(),
        }
    }

    fn default_user_agent() -> String {
        format!("syntra/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Overrides the `Origin` header value.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builds the absolute URL for a request path (which may carry a query
    /// string).
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
    }
}
