//! Sync service container for dependency injection.

use std::sync::Arc;

use syntra_core::{ApiGateway, ApiResult, ServiceHealth};

use crate::analysis::AnalysisService;
use crate::integration::IntegrationService;
use crate::poller::ReportPoller;
use crate::resource::ResourceSyncService;
use crate::selection::SelectionService;
use crate::store::EntityStore;

/// Container wiring every sync service to one shared entity store and
/// gateway.
#[derive(Clone)]
pub struct SyncServices {
    /// Integration CRUD orchestration.
    pub integrations: IntegrationService,
    /// Resource list fetching and sync triggering.
    pub resources: ResourceSyncService,
    /// Channel selection reconciliation.
    pub selection: SelectionService,
    /// Per-resource analysis job lifecycle.
    pub analyses: AnalysisService,
    /// Report completion polling.
    pub reports: ReportPoller,

    gateway: Arc<dyn ApiGateway>,
    store: EntityStore,
}

impl SyncServices {
    /// Builds the service set on top of a gateway implementation.
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        let store = EntityStore::new();
        Self {
            integrations: IntegrationService::new(gateway.clone(), store.clone()),
            resources: ResourceSyncService::new(gateway.clone(), store.clone()),
            selection: SelectionService::new(gateway.clone(), store.clone()),
            analyses: AnalysisService::new(gateway.clone()),
            reports: ReportPoller::new(gateway.clone(), store.clone()),
            gateway,
            store,
        }
    }

    /// The shared entity store.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Probes backend availability through the gateway.
    pub async fn health_check(&self) -> ApiResult<ServiceHealth> {
        self.gateway.health_check().await
    }

    /// Tears down background work. Pending poll timers never fire after
    /// this returns.
    pub fn shutdown(&self) {
        self.reports.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use syntra_core::ServiceStatus;
    use syntra_core::types::ServiceType;
    use syntra_test::{MockGateway, sample};
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn test_services_share_one_store() {
        let mock = MockGateway::new();
        let services = SyncServices::new(Arc::new(mock.clone()));
        let team = Uuid::now_v7();
        let integration = sample::integration(team, ServiceType::Slack);

        services.integrations.set_active_team(team);
        mock.expect(
            "GET",
            &format!("/integrations?team_id={team}"),
            Ok(sample::payload(&vec![integration.clone()])),
        );
        services.integrations.fetch_all(Some(team), None).await.unwrap();

        // The selection service reads the same store the orchestrator wrote.
        assert_eq!(services.store().snapshot().integrations, vec![integration]);
        assert!(!services.selection.is_selected("C0100"));
    }

    #[tokio::test]
    async fn test_health_check_passthrough() {
        let mock = MockGateway::new();
        let services = SyncServices::new(Arc::new(mock));
        let health = services.health_check().await.unwrap();
        assert_eq!(health.status, ServiceStatus::Healthy);
    }
}
