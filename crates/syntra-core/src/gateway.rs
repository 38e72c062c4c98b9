//! The API gateway seam between the sync core and the HTTP transport.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::health::ServiceHealth;

/// Result of a gateway call: the decoded JSON payload, or a normalized
/// [`ApiError`].
pub type GatewayResult = ApiResult<Value>;

/// Authenticated HTTP call wrapper consumed by the sync core.
///
/// Implementations own the full error taxonomy: transport failures, non-2xx
/// statuses, application-level error payloads on 2xx bodies, and malformed
/// bodies all surface as `Err(ApiError)`. Any other 2xx body is success data
/// — including bodies with no status field, since the backend's success
/// payload shape is not guaranteed uniform.
#[async_trait::async_trait]
pub trait ApiGateway: Send + Sync {
    /// Issues a GET request. `path` is relative to the API base URL and may
    /// carry a query string.
    async fn get(&self, path: &str) -> GatewayResult;

    /// Issues a POST request with an optional JSON body.
    async fn post(&self, path: &str, body: Option<Value>) -> GatewayResult;

    /// Issues a PUT request with a JSON body.
    async fn put(&self, path: &str, body: Value) -> GatewayResult;

    /// Probes backend availability.
    async fn health_check(&self) -> ApiResult<ServiceHealth>;
}

/// Decodes a gateway payload into a typed model.
///
/// A 2xx payload that does not match the expected schema is a malformed
/// response, reported as an [`ApiError`] value like every other failure mode.
pub fn decode_payload<T: DeserializeOwned>(payload: Value) -> ApiResult<T> {
    serde_json::from_value(payload).map_err(|err| ApiError::malformed(err.to_string()))
}
