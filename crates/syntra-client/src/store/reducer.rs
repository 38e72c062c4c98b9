//! The single state transition function.

use syntra_core::types::Integration;

use super::{StoreEvent, StoreState, TRACING_TARGET};

/// Applies one event to the state.
///
/// Every projection touched by an event is updated inside this one call;
/// callers hold the store lock across it, so no observer ever sees a
/// subset of the affected views updated.
pub(crate) fn reduce(state: &mut StoreState, event: StoreEvent) {
    match event {
        StoreEvent::FetchStarted { ticket } => {
            state.mark_loading(ticket.key);
            if let Some(slot) = ticket.key.owned_slot() {
                state.set_error(slot, None);
            }
        }

        StoreEvent::ScopeActivated { team_id } => {
            state.active_team = Some(team_id);
            state.integrations = state.by_team.get(&team_id).cloned().unwrap_or_default();
        }

        StoreEvent::IntegrationsLoaded {
            ticket,
            team_id,
            integrations,
        } => {
            if !state.is_latest(ticket) {
                discard_stale(ticket);
                return;
            }
            state.finish_loading(ticket.key);
            if state.active_team == Some(team_id) {
                state.integrations = integrations.clone();
            }
            state.by_team.insert(team_id, integrations);
        }

        StoreEvent::IntegrationsFailed { ticket, error }
        | StoreEvent::IntegrationFailed { ticket, error } => {
            if !state.is_latest(ticket) {
                discard_stale(ticket);
                return;
            }
            state.finish_loading(ticket.key);
            // Cached data stays untouched on failure.
            if let Some(slot) = ticket.key.owned_slot() {
                state.set_error(slot, Some(error));
            }
        }

        StoreEvent::IntegrationLoaded {
            ticket,
            integration,
        } => {
            if !state.is_latest(ticket) {
                discard_stale(ticket);
                return;
            }
            state.finish_loading(ticket.key);
            patch_by_id(&mut state.integrations, &integration);
            if let Some(cache) = state.by_team.get_mut(&integration.team_id) {
                patch_by_id(cache, &integration);
            }
            state.current = Some(integration);
        }

        StoreEvent::IntegrationCreated { integration } => {
            if state.active_team == Some(integration.team_id) {
                state.integrations.push(integration.clone());
            }
            state
                .by_team
                .entry(integration.team_id)
                .or_default()
                .push(integration);
        }

        StoreEvent::IntegrationUpdated { integration } => {
            if state
                .current
                .as_ref()
                .is_some_and(|current| current.id == integration.id)
            {
                state.current = Some(integration.clone());
            }
            patch_by_id(&mut state.integrations, &integration);
            if let Some(cache) = state.by_team.get_mut(&integration.team_id) {
                patch_by_id(cache, &integration);
            }
        }

        StoreEvent::MutationFailed { error } => {
            state.error = Some(error);
        }

        StoreEvent::ResourcesLoaded { ticket, resources } => {
            if !state.is_latest(ticket) {
                discard_stale(ticket);
                return;
            }
            state.finish_loading(ticket.key);
            state.resources = resources;
        }

        StoreEvent::ResourcesFailed { ticket, error } => {
            if !state.is_latest(ticket) {
                discard_stale(ticket);
                return;
            }
            state.finish_loading(ticket.key);
            state.resource_error = Some(error);
        }

        StoreEvent::SyncFailed { error } => {
            state.resource_error = Some(error);
        }

        StoreEvent::SelectionLoaded { ticket, resources } => {
            if !state.is_latest(ticket) {
                discard_stale(ticket);
                return;
            }
            state.finish_loading(ticket.key);
            state.selection = resources
                .into_iter()
                .filter(|resource| resource.is_selected_for_analysis())
                .collect();
        }

        StoreEvent::SelectionFailed { ticket, error } => {
            if let Some(ticket) = ticket {
                if !state.is_latest(ticket) {
                    discard_stale(ticket);
                    return;
                }
                state.finish_loading(ticket.key);
            }
            state.selection_error = Some(error);
        }

        StoreEvent::ReportLoaded { report } => {
            state.reports.insert(report.id, report);
        }

        StoreEvent::ErrorCleared { slot } => {
            state.set_error(slot, None);
        }
    }
}

fn discard_stale(ticket: super::FetchTicket) {
    tracing::trace!(
        target: TRACING_TARGET,
        key = ?ticket.key,
        seq = ticket.seq,
        "Discarding stale fetch completion"
    );
}

/// Replaces the entity by id if a copy is present; never inserts.
fn patch_by_id(list: &mut [Integration], integration: &Integration) {
    if let Some(slot) = list.iter_mut().find(|item| item.id == integration.id) {
        *slot = integration.clone();
    }
}
