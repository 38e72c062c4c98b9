//! Reqwest-based gateway implementation.

use std::sync::Arc;
use std::time::Instant;

use reqwest::{Client, Method, header};
use serde_json::Value;
use syntra_core::{
    ApiError, ApiGateway, ApiResult, GatewayResult, ServiceHealth, SessionProvider,
};

use crate::config::GatewayConfig;
use crate::error::{Error, Result};

/// Tracing target for gateway operations.
pub const TRACING_TARGET: &str = "syntra_reqwest::gateway";

struct GatewayInner {
    http: Client,
    config: GatewayConfig,
    session: Arc<dyn SessionProvider>,
}

impl std::fmt::Debug for GatewayInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayInner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Authenticated HTTP gateway backed by reqwest.
///
/// Every request carries the bearer credential from the injected
/// [`SessionProvider`] and the configured `Origin` header. All four
/// expected failure modes normalize into [`ApiError`] values here, so the
/// sync core only ever sees the two-case gateway result.
#[derive(Clone, Debug)]
pub struct ReqwestGateway {
    inner: Arc<GatewayInner>,
}

impl ReqwestGateway {
    /// Creates a new gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: GatewayConfig, session: Arc<dyn SessionProvider>) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET,
            base_url = %config.base_url,
            timeout_ms = config.timeout.as_millis() as u64,
            "Creating reqwest gateway"
        );

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let inner = GatewayInner {
            http,
            config,
            session,
        };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the gateway configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> GatewayResult {
        let url = self
            .inner
            .config
            .endpoint(path)
            .map_err(|err| ApiError::from(Error::Url(err)))?;
        let token = self.inner.session.bearer_token().await?;

        let mut request = self
            .inner
            .http
            .request(method.clone(), url)
            .bearer_auth(token)
            .header(header::ORIGIN, &self.inner.config.origin);
        if let Some(body) = &body {
            request = request.json(body);
        }

        tracing::debug!(
            target: TRACING_TARGET,
            method = %method,
            path,
            "Issuing backend request"
        );

        let response = request
            .send()
            .await
            .map_err(|err| ApiError::from(Error::Reqwest(err)))?;
        let status_code = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ApiError::from(Error::Reqwest(err)))?;

        let result = classify_body(status_code, &bytes);
        if let Err(error) = &result {
            tracing::warn!(
                target: TRACING_TARGET,
                method = %method,
                path,
                status_code,
                error = %error,
                "Backend request failed"
            );
        }
        result
    }
}

#[async_trait::async_trait]
impl ApiGateway for ReqwestGateway {
    async fn get(&self, path: &str) -> GatewayResult {
        self.execute(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> GatewayResult {
        self.execute(Method::POST, path, body).await
    }

    async fn put(&self, path: &str, body: Value) -> GatewayResult {
        self.execute(Method::PUT, path, Some(body)).await
    }

    async fn health_check(&self) -> ApiResult<ServiceHealth> {
        let started_at = Instant::now();
        let result = self
            .inner
            .http
            .get(self.inner.config.base_url.clone())
            .send()
            .await;
        let latency = started_at.elapsed();

        let health = match result {
            Ok(response) if response.status().is_success() => {
                ServiceHealth::healthy().with_latency(latency)
            }
            Ok(response) => {
                ServiceHealth::degraded(format!("backend answered {}", response.status()))
                    .with_latency(latency)
            }
            Err(err) => ServiceHealth::unhealthy(err.to_string()),
        };
        Ok(health)
    }
}

/// Normalizes a raw response into the two-case gateway result.
///
/// A body is an application-level error iff it carries both a `status`
/// field (numeric, or a string other than `"success"`) and a `message`
/// field; any other 2xx body is success data, since the backend's success
/// payload shape is not uniform. An empty 2xx body is `Null` success.
fn classify_body(status_code: u16, body: &[u8]) -> GatewayResult {
    if !(200..300).contains(&status_code) {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| format!("request failed with status {status_code}"));
        return Err(ApiError::http(status_code, message));
    }

    if body.is_empty() {
        return Ok(Value::Null);
    }

    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => return Err(ApiError::malformed(err.to_string())),
    };

    if let Some(error) = application_error(status_code, &value) {
        return Err(error);
    }
    Ok(value)
}

fn application_error(http_status: u16, value: &Value) -> Option<ApiError> {
    let message = value.get("message")?.as_str()?;
    let status = value.get("status")?;

    let status_code = match status {
        Value::Number(number) => number.as_u64().map(|code| code as u16)?,
        Value::String(text) if text != "success" => http_status,
        _ => return None,
    };

    let mut error = ApiError::application(status_code, message);
    if let Some(details) = value.get("details") {
        error = error.with_details(details.clone());
    }
    Some(error)
}
