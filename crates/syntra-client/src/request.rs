//! Request payloads for integration mutations.

use serde::{Deserialize, Serialize};
use syntra_core::ApiError;
use syntra_core::types::{IntegrationStatus, ServiceType};
use uuid::Uuid;
use validator::Validate;

/// Payload for creating a new integration.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateIntegration {
    /// Human-readable name for the integration.
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// The third-party service to connect.
    pub service_type: ServiceType,

    /// Team that will own the integration.
    pub team_id: Uuid,

    /// Optional service-specific configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl CreateIntegration {
    /// Creates a payload with required fields.
    pub fn new(name: impl Into<String>, service_type: ServiceType, team_id: Uuid) -> Self {
        Self {
            name: name.into(),
            service_type,
            team_id,
            metadata: None,
        }
    }

    /// Sets service-specific configuration.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Payload for updating an existing integration. Unset fields are left
/// unchanged by the backend.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateIntegration {
    /// Updated integration name.
    #[validate(length(min = 1, max = 100))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Updated connection status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IntegrationStatus>,

    /// Updated service-specific configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl UpdateIntegration {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the new name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the new status.
    pub fn with_status(mut self, status: IntegrationStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the new metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Converts validation failures into the request-rejected [`ApiError`].
pub(crate) fn validation_error(errors: validator::ValidationErrors) -> ApiError {
    ApiError::invalid_request(format!("invalid request payload: {errors}"))
}
