//! Integration model and lifecycle enumerations.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// The kind of third-party service an integration connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceType {
    /// Slack workspace connection.
    Slack,
    /// GitHub organization connection.
    Github,
    /// Jira site connection.
    Jira,
    /// Notion workspace connection.
    Notion,
}

impl ServiceType {
    /// Returns whether this service exposes channel resources.
    pub fn has_channels(self) -> bool {
        matches!(self, ServiceType::Slack)
    }
}

/// Connection status of an integration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IntegrationStatus {
    /// The integration is connected and usable.
    #[default]
    Active,
    /// The user disconnected the integration.
    Disconnected,
    /// The stored credential expired.
    Expired,
    /// The external service revoked access.
    Revoked,
    /// The integration is in an error state.
    Error,
}

impl IntegrationStatus {
    /// Returns whether the integration can serve requests.
    #[inline]
    pub fn is_operational(self) -> bool {
        matches!(self, IntegrationStatus::Active)
    }

    /// Returns whether the integration needs the user to reconnect.
    #[inline]
    pub fn needs_reconnect(self) -> bool {
        matches!(
            self,
            IntegrationStatus::Disconnected
                | IntegrationStatus::Expired
                | IntegrationStatus::Revoked
        )
    }

    /// Returns whether the integration is in a failure state.
    #[inline]
    pub fn has_failed(self) -> bool {
        matches!(self, IntegrationStatus::Error)
    }
}

/// A configured connection to a third-party service, owned by a team.
///
/// Exactly one authoritative copy exists per id in the entity store; every
/// view referencing an integration reflects the same version once a
/// mutating call completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    /// Unique integration identifier.
    pub id: Uuid,
    /// Human-readable integration name.
    pub name: String,
    /// The connected third-party service.
    pub service_type: ServiceType,
    /// Current connection status.
    pub status: IntegrationStatus,
    /// Team that owns this integration.
    pub team_id: Uuid,
    /// Service-specific configuration and metadata.
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// Timestamp when the integration was created.
    pub created_at: Timestamp,
    /// Timestamp when the integration was last updated.
    pub updated_at: Timestamp,
}

impl Integration {
    /// Returns whether the integration is connected and usable.
    pub fn is_operational(&self) -> bool {
        self.status.is_operational()
    }

    /// Returns whether the integration needs user attention.
    pub fn needs_attention(&self) -> bool {
        self.status.needs_reconnect() || self.status.has_failed()
    }
}
