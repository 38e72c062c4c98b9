//! Integration CRUD orchestration.

use std::sync::Arc;

use syntra_core::types::{Integration, ServiceType};
use syntra_core::{ApiGateway, ApiResult, decode_payload};
use uuid::Uuid;
use validator::Validate;

use crate::request::{CreateIntegration, UpdateIntegration, validation_error};
use crate::store::{EntityStore, FetchKey, StoreEvent};

/// Tracing target for integration CRUD operations.
pub const TRACING_TARGET: &str = "syntra_client::integration";

/// Sequences integration create/update/fetch calls and merges results into
/// the entity store.
///
/// Every operation both records its outcome in the store (data or scoped
/// error slot) and returns it to the caller.
#[derive(Clone)]
pub struct IntegrationService {
    gateway: Arc<dyn ApiGateway>,
    store: EntityStore,
}

impl IntegrationService {
    pub(crate) fn new(gateway: Arc<dyn ApiGateway>, store: EntityStore) -> Self {
        Self { gateway, store }
    }

    /// Selects the active team scope and re-projects the visible list from
    /// that scope's cache.
    pub fn set_active_team(&self, team_id: Uuid) {
        self.store.apply(StoreEvent::ScopeActivated { team_id });
    }

    /// Fetches the integration list for a team scope.
    ///
    /// A `None` scope is a no-op. On success the scope's cache is replaced,
    /// and the visible list too when the scope is active. On failure the
    /// error lands in the general slot and cached data stays untouched.
    /// Concurrent fetches for the same scope resolve last-issued-wins.
    pub async fn fetch_all(
        &self,
        team_id: Option<Uuid>,
        service_type: Option<ServiceType>,
    ) -> ApiResult<Vec<Integration>> {
        let Some(team_id) = team_id else {
            tracing::trace!(
                target: TRACING_TARGET,
                "No team scope selected, skipping integration fetch"
            );
            return Ok(Vec::new());
        };

        let ticket = self.store.begin_fetch(FetchKey::TeamIntegrations(team_id));

        let mut path = format!("/integrations?team_id={team_id}");
        if let Some(service_type) = service_type {
            path.push_str(&format!("&service_type={service_type}"));
        }

        match self.gateway.get(&path).await.and_then(decode_payload::<Vec<Integration>>) {
            Ok(integrations) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    team_id = %team_id,
                    count = integrations.len(),
                    "Fetched integration list"
                );
                self.store.apply(StoreEvent::IntegrationsLoaded {
                    ticket,
                    team_id,
                    integrations: integrations.clone(),
                });
                Ok(integrations)
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    team_id = %team_id,
                    error = %error,
                    "Failed to fetch integration list"
                );
                self.store.apply(StoreEvent::IntegrationsFailed {
                    ticket,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Fetches a single integration and makes it the current pointer.
    ///
    /// The entity is also patched in place inside any list already
    /// containing it, so no view keeps an older version.
    pub async fn fetch_one(&self, id: Uuid) -> ApiResult<Integration> {
        let ticket = self.store.begin_fetch(FetchKey::Integration(id));

        let path = format!("/integrations/{id}");
        match self.gateway.get(&path).await.and_then(decode_payload::<Integration>) {
            Ok(integration) => {
                self.store.apply(StoreEvent::IntegrationLoaded {
                    ticket,
                    integration: integration.clone(),
                });
                Ok(integration)
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    integration_id = %id,
                    error = %error,
                    "Failed to fetch integration"
                );
                self.store.apply(StoreEvent::IntegrationFailed {
                    ticket,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Creates a new integration.
    ///
    /// On success the entity joins its owner's scope cache unconditionally
    /// and the visible list only when the owner is the active scope.
    pub async fn create(&self, request: CreateIntegration) -> ApiResult<Integration> {
        if let Err(errors) = request.validate() {
            return Err(validation_error(errors));
        }

        // Slack uses a dedicated create endpoint.
        let path = match request.service_type {
            ServiceType::Slack => "/integrations/slack",
            _ => "/integrations",
        };
        let body = serde_json::to_value(&request)
            .map_err(|err| syntra_core::ApiError::invalid_request(err.to_string()))?;

        match self
            .gateway
            .post(path, Some(body))
            .await
            .and_then(decode_payload::<Integration>)
        {
            Ok(integration) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    integration_id = %integration.id,
                    service_type = %integration.service_type,
                    "Created integration"
                );
                self.store.apply(StoreEvent::IntegrationCreated {
                    integration: integration.clone(),
                });
                Ok(integration)
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Failed to create integration"
                );
                self.store
                    .apply(StoreEvent::MutationFailed { error: error.clone() });
                Err(error)
            }
        }
    }

    /// Updates an existing integration.
    ///
    /// On success the entity is replaced by id in the current pointer, the
    /// visible list, and its owner's cache within one store transition, so
    /// no observer ever sees only a subset updated.
    pub async fn update(&self, id: Uuid, request: UpdateIntegration) -> ApiResult<Integration> {
        if let Err(errors) = request.validate() {
            return Err(validation_error(errors));
        }

        let path = format!("/integrations/{id}");
        let body = serde_json::to_value(&request)
            .map_err(|err| syntra_core::ApiError::invalid_request(err.to_string()))?;

        match self.gateway.put(&path, body).await.and_then(decode_payload::<Integration>) {
            Ok(integration) => {
                self.store.apply(StoreEvent::IntegrationUpdated {
                    integration: integration.clone(),
                });
                Ok(integration)
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    integration_id = %id,
                    error = %error,
                    "Failed to update integration"
                );
                self.store
                    .apply(StoreEvent::MutationFailed { error: error.clone() });
                Err(error)
            }
        }
    }
}
