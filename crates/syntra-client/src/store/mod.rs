//! In-memory normalized entity state.
//!
//! The store is the sole shared mutable resource of the sync core. All
//! mutation goes through [`reduce`], a pure `(state, event) -> state`
//! transition applied under a single lock acquisition, so overlapping
//! projections (scoped cache, global list, current pointer) are never
//! observable half-applied.
//!
//! [`reduce`]: reducer::reduce

mod event;
mod reducer;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use syntra_core::ApiError;
use syntra_core::types::{AnalysisReport, Integration, ServiceResource};
use uuid::Uuid;

pub use event::StoreEvent;

/// Tracing target for store operations.
pub const TRACING_TARGET: &str = "syntra_client::store";

/// Logical key identifying a fetch family for sequencing and loading flags.
///
/// Fetches for different keys are independent and may run in parallel;
/// fetches for the same key are sequenced by ticket (last issued wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKey {
    /// Integration list for one team scope.
    TeamIntegrations(Uuid),
    /// A single integration by id.
    Integration(Uuid),
    /// Resource list of one integration.
    Resources(Uuid),
    /// Channel selection set of one integration.
    Selection(Uuid),
    /// A cross-resource report by id.
    Report(Uuid),
}

impl FetchKey {
    /// The error slot this fetch family writes on failure.
    ///
    /// Report checks are soft failures and own no slot.
    pub(crate) fn owned_slot(self) -> Option<ErrorSlot> {
        match self {
            FetchKey::TeamIntegrations(_) | FetchKey::Integration(_) => Some(ErrorSlot::General),
            FetchKey::Resources(_) => Some(ErrorSlot::Resource),
            FetchKey::Selection(_) => Some(ErrorSlot::Selection),
            FetchKey::Report(_) => None,
        }
    }
}

/// Per-key monotonic sequence number attached to every fetch.
///
/// The reducer discards any completion whose ticket is not the latest
/// issued for its key, turning the same-key "last response wins" race into
/// a defined last-issued-wins rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    /// The fetch family this ticket belongs to.
    pub key: FetchKey,
    /// Sequence number within the family, starting at 1.
    pub seq: u64,
}

/// Scoped error slots; unrelated subsystems never overwrite each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSlot {
    /// CRUD fetch/mutation errors.
    General,
    /// Resource list and sync errors.
    Resource,
    /// Channel selection errors.
    Selection,
}

/// The normalized client-side view of backend entities.
#[derive(Debug, Default, Clone)]
pub struct StoreState {
    /// The team scope currently shown to the consumer.
    pub active_team: Option<Uuid>,
    /// Integration list projected for the active scope.
    pub integrations: Vec<Integration>,
    /// Per-team integration caches, kept across scope switches.
    pub by_team: HashMap<Uuid, Vec<Integration>>,
    /// The single "current" integration pointer.
    pub current: Option<Integration>,
    /// Resource list of the most recently fetched integration.
    pub resources: Vec<ServiceResource>,
    /// Last-fetched selection snapshot (channels selected for analysis).
    pub selection: Vec<ServiceResource>,
    /// Report snapshots kept fresh by the poller.
    pub reports: HashMap<Uuid, AnalysisReport>,
    /// CRUD error slot.
    pub error: Option<ApiError>,
    /// Resource/sync error slot.
    pub resource_error: Option<ApiError>,
    /// Selection error slot.
    pub selection_error: Option<ApiError>,

    loading: HashSet<FetchKey>,
    issued: HashMap<FetchKey, u64>,
}

impl StoreState {
    /// Returns whether a fetch for `key` is in flight.
    pub fn is_loading(&self, key: FetchKey) -> bool {
        self.loading.contains(&key)
    }

    /// Reads an error slot.
    pub fn error(&self, slot: ErrorSlot) -> Option<&ApiError> {
        match slot {
            ErrorSlot::General => self.error.as_ref(),
            ErrorSlot::Resource => self.resource_error.as_ref(),
            ErrorSlot::Selection => self.selection_error.as_ref(),
        }
    }

    /// Returns whether `key` names a resource in the selection snapshot,
    /// matching by internal or external id. Unknown keys are `false`.
    pub fn is_selected(&self, key: &str) -> bool {
        self.selection.iter().any(|resource| resource.matches_key(key))
    }

    pub(crate) fn is_latest(&self, ticket: FetchTicket) -> bool {
        self.issued.get(&ticket.key).copied() == Some(ticket.seq)
    }

    pub(crate) fn mark_loading(&mut self, key: FetchKey) {
        self.loading.insert(key);
    }

    pub(crate) fn finish_loading(&mut self, key: FetchKey) {
        self.loading.remove(&key);
    }

    pub(crate) fn set_error(&mut self, slot: ErrorSlot, error: Option<ApiError>) {
        match slot {
            ErrorSlot::General => self.error = error,
            ErrorSlot::Resource => self.resource_error = error,
            ErrorSlot::Selection => self.selection_error = error,
        }
    }
}

/// Cheaply cloneable handle over the shared [`StoreState`].
#[derive(Clone, Default)]
pub struct EntityStore {
    inner: Arc<RwLock<StoreState>>,
}

impl EntityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a point-in-time copy of the full state.
    pub fn snapshot(&self) -> StoreState {
        self.read(|state| state.clone())
    }

    /// Runs a read-only closure against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        let state = self.inner.read().expect("store lock poisoned");
        f(&state)
    }

    /// Applies one event through the reducer.
    pub fn apply(&self, event: StoreEvent) {
        let mut state = self.inner.write().expect("store lock poisoned");
        reducer::reduce(&mut state, event);
    }

    /// Issues a fetch ticket for `key` and marks the fetch started.
    ///
    /// Bumps the key's sequence counter, sets the loading flag, and clears
    /// the error slot the fetch family owns, all in one transition.
    pub fn begin_fetch(&self, key: FetchKey) -> FetchTicket {
        let mut state = self.inner.write().expect("store lock poisoned");
        let seq = state.issued.entry(key).or_insert(0);
        *seq += 1;
        let ticket = FetchTicket { key, seq: *seq };
        reducer::reduce(&mut state, StoreEvent::FetchStarted { ticket });
        ticket
    }

    /// Returns whether a fetch for `key` is in flight.
    pub fn is_loading(&self, key: FetchKey) -> bool {
        self.read(|state| state.is_loading(key))
    }

    /// Explicitly clears one error slot.
    pub fn clear_error(&self, slot: ErrorSlot) {
        self.apply(StoreEvent::ErrorCleared { slot });
    }

    /// Returns whether `key` names a selected resource (internal or
    /// external id); unknown keys are `false`.
    pub fn is_selected(&self, key: &str) -> bool {
        self.read(|state| state.is_selected(key))
    }
}
