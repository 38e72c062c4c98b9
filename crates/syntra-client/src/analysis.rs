//! Per-resource analysis job lifecycle.

use std::sync::Arc;

use syntra_core::types::ResourceAnalysis;
use syntra_core::{ApiGateway, ApiResult, decode_payload};
use uuid::Uuid;

/// Tracing target for analysis job operations.
pub const TRACING_TARGET: &str = "syntra_client::analysis";

/// Requests and reads per-resource analysis jobs.
///
/// Job results are returned to the caller directly; the long-running
/// cross-resource reports they roll up into are tracked by the poller.
#[derive(Clone)]
pub struct AnalysisService {
    gateway: Arc<dyn ApiGateway>,
}

impl AnalysisService {
    pub(crate) fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self { gateway }
    }

    fn resource_path(integration_id: Uuid, resource_id: Uuid) -> String {
        format!("/integrations/{integration_id}/resources/{resource_id}")
    }

    /// Requests a new analysis of one resource.
    pub async fn request_analysis(
        &self,
        integration_id: Uuid,
        resource_id: Uuid,
    ) -> ApiResult<ResourceAnalysis> {
        let path = format!("{}/analyze", Self::resource_path(integration_id, resource_id));
        match self
            .gateway
            .post(&path, None)
            .await
            .and_then(decode_payload::<ResourceAnalysis>)
        {
            Ok(analysis) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    analysis_id = %analysis.id,
                    resource_id = %resource_id,
                    "Requested resource analysis"
                );
                Ok(analysis)
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    resource_id = %resource_id,
                    error = %error,
                    "Failed to request resource analysis"
                );
                Err(error)
            }
        }
    }

    /// Fetches all analyses recorded for one resource.
    pub async fn fetch_analyses(
        &self,
        integration_id: Uuid,
        resource_id: Uuid,
    ) -> ApiResult<Vec<ResourceAnalysis>> {
        let path = format!(
            "{}/analyses",
            Self::resource_path(integration_id, resource_id)
        );
        self.gateway
            .get(&path)
            .await
            .and_then(decode_payload::<Vec<ResourceAnalysis>>)
    }

    /// Fetches the most recent analysis for one resource.
    ///
    /// A resource that has never been analyzed answers 404; that is a
    /// `None`, not an error.
    pub async fn fetch_latest(
        &self,
        integration_id: Uuid,
        resource_id: Uuid,
    ) -> ApiResult<Option<ResourceAnalysis>> {
        let path = format!(
            "{}/analyses/latest",
            Self::resource_path(integration_id, resource_id)
        );
        match self.gateway.get(&path).await {
            Ok(payload) => decode_payload::<ResourceAnalysis>(payload).map(Some),
            Err(error) if error.status_code == 404 => Ok(None),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    resource_id = %resource_id,
                    error = %error,
                    "Failed to fetch latest analysis"
                );
                Err(error)
            }
        }
    }
}
