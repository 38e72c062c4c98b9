//! Channel selection reconciliation.

use std::collections::HashSet;
use std::sync::Arc;

use syntra_core::types::ServiceResource;
use syntra_core::{ApiGateway, ApiResult, decode_payload};
use uuid::Uuid;

use crate::store::{EntityStore, FetchKey, StoreEvent};

/// Tracing target for selection operations.
pub const TRACING_TARGET: &str = "syntra_client::selection";

/// Converges the remote "selected for analysis" channel set to a desired
/// set with minimal calls.
///
/// One backend endpoint serves both directions, so every mutation carries
/// an explicit `for_analysis` flag.
#[derive(Clone)]
pub struct SelectionService {
    gateway: Arc<dyn ApiGateway>,
    store: EntityStore,
}

impl SelectionService {
    pub(crate) fn new(gateway: Arc<dyn ApiGateway>, store: EntityStore) -> Self {
        Self { gateway, store }
    }

    fn channels_path(integration_id: Uuid) -> String {
        format!("/integrations/{integration_id}/resources?resource_type=channel")
    }

    fn selection_path(integration_id: Uuid) -> String {
        format!("/integrations/{integration_id}/resources/channel-selection")
    }

    /// Fetches the channel list and refreshes the selection snapshot,
    /// returning the currently selected channels.
    pub async fn fetch_selection(&self, integration_id: Uuid) -> ApiResult<Vec<ServiceResource>> {
        let ticket = self.store.begin_fetch(FetchKey::Selection(integration_id));

        let path = Self::channels_path(integration_id);
        match self
            .gateway
            .get(&path)
            .await
            .and_then(decode_payload::<Vec<ServiceResource>>)
        {
            Ok(channels) => {
                let selected: Vec<ServiceResource> = channels
                    .iter()
                    .filter(|channel| channel.is_selected_for_analysis())
                    .cloned()
                    .collect();
                tracing::debug!(
                    target: TRACING_TARGET,
                    integration_id = %integration_id,
                    channels = channels.len(),
                    selected = selected.len(),
                    "Refreshed selection snapshot"
                );
                self.store.apply(StoreEvent::SelectionLoaded {
                    ticket,
                    resources: channels,
                });
                Ok(selected)
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    integration_id = %integration_id,
                    error = %error,
                    "Failed to fetch selection"
                );
                self.store.apply(StoreEvent::SelectionFailed {
                    ticket: Some(ticket),
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Reconciles the remote selection to exactly `desired`.
    ///
    /// Computes the add/remove delta against the current remote state and
    /// issues up to two selection calls — or a single replace-with-empty
    /// call when `desired` is empty. The result is then confirmed by
    /// re-fetching the selection set; the delta is never assumed applied.
    pub async fn reconcile(&self, integration_id: Uuid, desired: &[Uuid]) -> ApiResult<()> {
        let current = self.fetch_selection(integration_id).await?;
        let current_ids: HashSet<Uuid> = current.iter().map(|channel| channel.id).collect();
        let desired_ids: HashSet<Uuid> = desired.iter().copied().collect();

        if desired_ids.is_empty() {
            // One replace-with-empty call instead of a removal per channel.
            self.apply_selection(integration_id, &[], true).await?;
        } else {
            let to_add: Vec<Uuid> = desired_ids.difference(&current_ids).copied().collect();
            let to_remove: Vec<Uuid> = current_ids.difference(&desired_ids).copied().collect();
            tracing::debug!(
                target: TRACING_TARGET,
                integration_id = %integration_id,
                to_add = to_add.len(),
                to_remove = to_remove.len(),
                "Computed selection delta"
            );
            if !to_add.is_empty() {
                self.apply_selection(integration_id, &to_add, true).await?;
            }
            if !to_remove.is_empty() {
                self.apply_selection(integration_id, &to_remove, false).await?;
            }
        }

        self.fetch_selection(integration_id).await?;
        Ok(())
    }

    async fn apply_selection(
        &self,
        integration_id: Uuid,
        channel_ids: &[Uuid],
        for_analysis: bool,
    ) -> ApiResult<()> {
        let body = serde_json::json!({
            "channel_ids": channel_ids,
            "for_analysis": for_analysis,
        });

        match self
            .gateway
            .post(&Self::selection_path(integration_id), Some(body))
            .await
        {
            Ok(_) => Ok(()),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    integration_id = %integration_id,
                    for_analysis,
                    error = %error,
                    "Selection call failed"
                );
                self.store.apply(StoreEvent::SelectionFailed {
                    ticket: None,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Returns whether `key` (internal or external id) is in the
    /// last-fetched selection set. Unknown keys are `false`.
    pub fn is_selected(&self, key: &str) -> bool {
        self.store.is_selected(key)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use syntra_core::ApiError;
    use syntra_test::{MockGateway, sample};
    use uuid::Uuid;

    use super::*;

    fn service(mock: &MockGateway) -> (SelectionService, EntityStore) {
        let store = EntityStore::new();
        (
            SelectionService::new(Arc::new(mock.clone()), store.clone()),
            store,
        )
    }

    fn channels_path(integration_id: Uuid) -> String {
        SelectionService::channels_path(integration_id)
    }

    fn selection_path(integration_id: Uuid) -> String {
        SelectionService::selection_path(integration_id)
    }

    #[tokio::test]
    async fn test_reconcile_issues_delta_calls_and_confirms() {
        let mock = MockGateway::new();
        let (service, store) = service(&mock);
        let integration_id = Uuid::now_v7();

        let kept_out = sample::channel(integration_id, "C0100", true);
        let mut wanted = sample::channel(integration_id, "C0200", false);

        mock.expect(
            "GET",
            &channels_path(integration_id),
            Ok(sample::payload(&vec![kept_out.clone(), wanted.clone()])),
        );
        mock.stick("POST", &selection_path(integration_id), Ok(serde_json::json!({})));

        // Post-mutation refresh shows the converged state.
        wanted
            .metadata
            .as_object_mut()
            .expect("channel metadata is an object")
            .insert("is_selected_for_analysis".to_string(), serde_json::json!(true));
        let mut settled = kept_out.clone();
        settled
            .metadata
            .as_object_mut()
            .expect("channel metadata is an object")
            .insert("is_selected_for_analysis".to_string(), serde_json::json!(false));
        mock.expect(
            "GET",
            &channels_path(integration_id),
            Ok(sample::payload(&vec![settled, wanted.clone()])),
        );

        service.reconcile(integration_id, &[wanted.id]).await.unwrap();

        let posts: Vec<_> = mock
            .calls()
            .into_iter()
            .filter(|call| call.method == "POST")
            .collect();
        assert_eq!(posts.len(), 2);

        let select = posts[0].body.as_ref().unwrap();
        assert_eq!(select["for_analysis"], serde_json::json!(true));
        assert_eq!(
            select["channel_ids"],
            serde_json::json!([wanted.id.to_string()])
        );

        let deselect = posts[1].body.as_ref().unwrap();
        assert_eq!(deselect["for_analysis"], serde_json::json!(false));
        assert_eq!(
            deselect["channel_ids"],
            serde_json::json!([kept_out.id.to_string()])
        );

        // The snapshot reflects backend truth, not the computed delta.
        let state = store.snapshot();
        assert_eq!(state.selection, vec![wanted.clone()]);
        assert!(service.is_selected(&wanted.id.to_string()));
        assert!(service.is_selected("C0200"));
        assert!(!service.is_selected("C0100"));
    }

    #[tokio::test]
    async fn test_reconcile_empty_set_issues_single_replace_call() {
        let mock = MockGateway::new();
        let (service, _store) = service(&mock);
        let integration_id = Uuid::now_v7();

        let selected_a = sample::channel(integration_id, "C0001", true);
        let selected_b = sample::channel(integration_id, "C0002", true);
        let selected_c = sample::channel(integration_id, "C0003", true);

        mock.expect(
            "GET",
            &channels_path(integration_id),
            Ok(sample::payload(&vec![selected_a, selected_b, selected_c])),
        );
        mock.expect("POST", &selection_path(integration_id), Ok(serde_json::json!({})));
        mock.expect(
            "GET",
            &channels_path(integration_id),
            Ok(sample::payload(&Vec::<ServiceResource>::new())),
        );

        service.reconcile(integration_id, &[]).await.unwrap();

        // One replace call, not one removal per selected channel.
        assert_eq!(mock.count_matching("POST", "/integrations"), 1);
        let post = mock
            .calls()
            .into_iter()
            .find(|call| call.method == "POST")
            .unwrap();
        let body = post.body.unwrap();
        assert_eq!(body["channel_ids"], serde_json::json!([]));
        assert_eq!(body["for_analysis"], serde_json::json!(true));
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent_once_converged() {
        let mock = MockGateway::new();
        let (service, _store) = service(&mock);
        let integration_id = Uuid::now_v7();
        let selected = sample::channel(integration_id, "C0100", true);

        mock.stick(
            "GET",
            &channels_path(integration_id),
            Ok(sample::payload(&vec![selected.clone()])),
        );

        // Remote already matches the desired set: no mutation calls, only
        // the confirming re-fetch.
        service.reconcile(integration_id, &[selected.id]).await.unwrap();
        assert_eq!(mock.count_matching("POST", "/integrations"), 0);
        assert_eq!(mock.count_matching("GET", "/integrations"), 2);
    }

    #[tokio::test]
    async fn test_selection_failure_uses_selection_slot() {
        let mock = MockGateway::new();
        let (service, store) = service(&mock);
        let integration_id = Uuid::now_v7();

        mock.expect(
            "GET",
            &channels_path(integration_id),
            Ok(sample::payload(&Vec::<ServiceResource>::new())),
        );
        mock.expect(
            "POST",
            &selection_path(integration_id),
            Err(ApiError::http(500, "selection failed")),
        );

        let error = service.reconcile(integration_id, &[]).await.unwrap_err();
        assert_eq!(error.status_code, 500);

        let state = store.snapshot();
        assert_eq!(
            state.selection_error.as_ref().map(|e| e.status_code),
            Some(500)
        );
        assert!(state.error.is_none());
        assert!(state.resource_error.is_none());
    }

    #[tokio::test]
    async fn test_is_selected_on_empty_snapshot() {
        let mock = MockGateway::new();
        let (service, _store) = service(&mock);
        assert!(!service.is_selected("anything"));
    }
}
