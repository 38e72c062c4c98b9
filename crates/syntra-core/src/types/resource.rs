//! Service resource model.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Metadata key marking a resource as selected for analysis.
pub const SELECTED_FOR_ANALYSIS_KEY: &str = "is_selected_for_analysis";

/// The kind of item an integration exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceType {
    /// A conversation channel (e.g. a Slack channel).
    Channel,
    /// A member of the connected service.
    User,
    /// A source repository.
    Repository,
    /// A project or board.
    Project,
}

/// An item exposed by an integration, owned by exactly one [`Integration`].
///
/// [`Integration`]: super::Integration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResource {
    /// Unique resource identifier.
    pub id: Uuid,
    /// The integration this resource belongs to.
    pub integration_id: Uuid,
    /// The kind of resource.
    pub resource_type: ResourceType,
    /// Identifier of the resource in the external service (e.g. "C0123").
    pub external_id: String,
    /// Human-readable resource name.
    pub name: String,
    /// Service-specific metadata, including the analysis-selection flag.
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// Timestamp of the last successful sync for this resource.
    #[serde(default)]
    pub last_synced_at: Option<Timestamp>,
}

impl ServiceResource {
    /// Returns whether this resource is marked for inclusion in analysis.
    ///
    /// The flag is derived from backend metadata; it is never maintained
    /// client-side past a refresh.
    pub fn is_selected_for_analysis(&self) -> bool {
        self.metadata
            .get(SELECTED_FOR_ANALYSIS_KEY)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns whether `key` matches this resource's internal or external id.
    pub fn matches_key(&self, key: &str) -> bool {
        self.external_id == key || self.id.to_string() == key
    }
}
