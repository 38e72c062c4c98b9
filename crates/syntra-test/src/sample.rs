//! Canned domain payloads for tests.

use jiff::Timestamp;
use serde_json::Value;
use syntra_core::types::{
    AnalysisReport, AnalysisStatus, Integration, IntegrationStatus, ResourceType,
    SELECTED_FOR_ANALYSIS_KEY, ServiceResource, ServiceType, SubAnalysis,
};
use uuid::Uuid;

/// Builds an active integration owned by `team_id`.
pub fn integration(team_id: Uuid, service_type: ServiceType) -> Integration {
    let now = Timestamp::now();
    Integration {
        id: Uuid::now_v7(),
        name: format!("{service_type} integration"),
        service_type,
        status: IntegrationStatus::Active,
        team_id,
        metadata: serde_json::json!({}),
        created_at: now,
        updated_at: now,
    }
}

/// Builds a channel resource with the given external id and selection flag.
pub fn channel(integration_id: Uuid, external_id: &str, selected: bool) -> ServiceResource {
    ServiceResource {
        id: Uuid::now_v7(),
        integration_id,
        resource_type: ResourceType::Channel,
        external_id: external_id.to_string(),
        name: format!("#{}", external_id.to_lowercase()),
        metadata: serde_json::json!({ SELECTED_FOR_ANALYSIS_KEY: selected }),
        last_synced_at: None,
    }
}

/// Builds a report whose sub-analyses carry the given statuses.
pub fn report(id: Uuid, statuses: &[AnalysisStatus]) -> AnalysisReport {
    AnalysisReport {
        id,
        title: "Cross-resource report".to_string(),
        status: if statuses.iter().all(|s| s.is_terminal()) {
            AnalysisStatus::Completed
        } else {
            AnalysisStatus::InProgress
        },
        resource_count: statuses.len() as u32,
        created_at: Timestamp::now(),
        sub_analyses: statuses
            .iter()
            .map(|status| SubAnalysis {
                resource_id: Uuid::now_v7(),
                status: *status,
            })
            .collect(),
    }
}

/// Serializes a model into the JSON value a gateway would return.
pub fn payload<T: serde::Serialize>(model: &T) -> Value {
    serde_json::to_value(model).expect("sample models always serialize")
}
