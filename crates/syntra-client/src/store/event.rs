//! Store transition events.

use syntra_core::ApiError;
use syntra_core::types::{AnalysisReport, Integration, ServiceResource};
use uuid::Uuid;

use super::{ErrorSlot, FetchTicket};

/// One state transition applied by the reducer.
///
/// Completion events carry the [`FetchTicket`] they were issued under;
/// stale tickets are discarded wholesale.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// A fetch was issued: mark it loading and clear its owned error slot.
    FetchStarted {
        /// Ticket issued for the fetch.
        ticket: FetchTicket,
    },
    /// The consumer switched to a different team scope.
    ScopeActivated {
        /// The newly active team.
        team_id: Uuid,
    },
    /// A team's integration list arrived.
    IntegrationsLoaded {
        /// Ticket of the originating fetch.
        ticket: FetchTicket,
        /// Scope the list belongs to.
        team_id: Uuid,
        /// The fresh list, replacing the scope cache.
        integrations: Vec<Integration>,
    },
    /// A team's integration list failed to load.
    IntegrationsFailed {
        /// Ticket of the originating fetch.
        ticket: FetchTicket,
        /// The failure, stored in the general slot.
        error: ApiError,
    },
    /// A single integration arrived.
    IntegrationLoaded {
        /// Ticket of the originating fetch.
        ticket: FetchTicket,
        /// The fresh entity.
        integration: Integration,
    },
    /// A single-integration fetch failed.
    IntegrationFailed {
        /// Ticket of the originating fetch.
        ticket: FetchTicket,
        /// The failure, stored in the general slot.
        error: ApiError,
    },
    /// A create call succeeded.
    IntegrationCreated {
        /// The newly created entity.
        integration: Integration,
    },
    /// An update call succeeded.
    IntegrationUpdated {
        /// The updated entity, replacing every copy by id.
        integration: Integration,
    },
    /// A create or update call failed.
    MutationFailed {
        /// The failure, stored in the general slot.
        error: ApiError,
    },
    /// An integration's resource list arrived.
    ResourcesLoaded {
        /// Ticket of the originating fetch.
        ticket: FetchTicket,
        /// The fresh resource list.
        resources: Vec<ServiceResource>,
    },
    /// A resource list fetch failed.
    ResourcesFailed {
        /// Ticket of the originating fetch.
        ticket: FetchTicket,
        /// The failure, stored in the resource slot.
        error: ApiError,
    },
    /// A sync trigger failed before any refresh happened.
    SyncFailed {
        /// The failure, stored in the resource slot.
        error: ApiError,
    },
    /// A channel list arrived for selection tracking.
    SelectionLoaded {
        /// Ticket of the originating fetch.
        ticket: FetchTicket,
        /// All channel resources; the reducer keeps the selected ones.
        resources: Vec<ServiceResource>,
    },
    /// A selection fetch or mutation failed.
    SelectionFailed {
        /// Ticket of the originating fetch, if the failure came from one.
        ticket: Option<FetchTicket>,
        /// The failure, stored in the selection slot.
        error: ApiError,
    },
    /// A report snapshot arrived from the poller.
    ReportLoaded {
        /// The fresh report.
        report: AnalysisReport,
    },
    /// An error slot was explicitly cleared.
    ErrorCleared {
        /// The slot to clear.
        slot: ErrorSlot,
    },
}
