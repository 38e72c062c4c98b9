//! Resource list fetching and remote sync triggering.

use std::sync::Arc;

use syntra_core::types::{ResourceType, ServiceResource};
use syntra_core::{ApiGateway, ApiResult, decode_payload};
use uuid::Uuid;

use crate::store::{EntityStore, FetchKey, StoreEvent};

/// Tracing target for resource sync operations.
pub const TRACING_TARGET: &str = "syntra_client::resource";

/// Triggers remote resource synchronization and keeps the resource list
/// fresh.
///
/// Sync and fetch failures land in the dedicated resource-error slot, so
/// they never mask (or get masked by) general CRUD errors.
#[derive(Clone)]
pub struct ResourceSyncService {
    gateway: Arc<dyn ApiGateway>,
    store: EntityStore,
}

impl ResourceSyncService {
    pub(crate) fn new(gateway: Arc<dyn ApiGateway>, store: EntityStore) -> Self {
        Self { gateway, store }
    }

    fn resources_path(integration_id: Uuid, filter: Option<ResourceType>) -> String {
        let mut path = format!("/integrations/{integration_id}/resources");
        if let Some(resource_type) = filter {
            path.push_str(&format!("?resource_type={resource_type}"));
        }
        path
    }

    /// Fetches an integration's resource list and replaces the stored one.
    pub async fn fetch_resources(
        &self,
        integration_id: Uuid,
        filter: Option<ResourceType>,
    ) -> ApiResult<Vec<ServiceResource>> {
        let ticket = self.store.begin_fetch(FetchKey::Resources(integration_id));

        let path = Self::resources_path(integration_id, filter);
        match self
            .gateway
            .get(&path)
            .await
            .and_then(decode_payload::<Vec<ServiceResource>>)
        {
            Ok(resources) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    integration_id = %integration_id,
                    count = resources.len(),
                    "Fetched resource list"
                );
                self.store.apply(StoreEvent::ResourcesLoaded {
                    ticket,
                    resources: resources.clone(),
                });
                Ok(resources)
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    integration_id = %integration_id,
                    error = %error,
                    "Failed to fetch resource list"
                );
                self.store.apply(StoreEvent::ResourcesFailed {
                    ticket,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Triggers a remote sync, then re-fetches the resource list.
    ///
    /// The sync endpoint's response shape is not uniform; anything the
    /// gateway reports as success — including an empty object or a body
    /// with no status field — counts, and the response body is never
    /// trusted as the new list. The refreshed list comes from a dedicated
    /// re-fetch.
    pub async fn sync(
        &self,
        integration_id: Uuid,
        filter: Option<ResourceType>,
    ) -> ApiResult<Vec<ServiceResource>> {
        let mut path = format!("/integrations/{integration_id}/sync");
        if let Some(resource_type) = filter {
            path.push_str(&format!("?resource_type={resource_type}"));
        }

        match self.gateway.post(&path, None).await {
            Ok(_body) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    integration_id = %integration_id,
                    "Sync accepted, refreshing resource list"
                );
                self.fetch_resources(integration_id, filter).await
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    integration_id = %integration_id,
                    error = %error,
                    "Resource sync failed"
                );
                self.store
                    .apply(StoreEvent::SyncFailed { error: error.clone() });
                Err(error)
            }
        }
    }
}
