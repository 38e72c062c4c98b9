//! Report completion polling.
//!
//! Tracks long-running cross-resource reports by re-checking their status
//! until no sub-analysis remains pending. Each report runs at most one
//! chain, implemented as an explicit cancellable task: the chain consults
//! its cancellation token before every scheduled follow-up, so consumer
//! teardown never lets a timer fire into a discarded consumer.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use syntra_core::types::AnalysisReport;
use syntra_core::{ApiGateway, ApiResult, decode_payload};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::store::{EntityStore, StoreEvent};

/// Tracing target for poller operations.
pub const TRACING_TARGET: &str = "syntra_client::poller";

/// Fixed delay between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Poll chain state for one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No chain is running and the report has not settled.
    Idle,
    /// A chain is running.
    Polling,
    /// The last chain observed zero pending sub-analyses.
    Settled,
}

struct Chain {
    id: u64,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Registry {
    chains: HashMap<Uuid, Chain>,
    settled: HashSet<Uuid>,
    next_chain: u64,
}

/// Polls report completion status until every sub-analysis settles.
///
/// There is no wall-clock bound: a report that never settles polls until
/// the chain is cancelled.
#[derive(Clone)]
pub struct ReportPoller {
    gateway: Arc<dyn ApiGateway>,
    store: EntityStore,
    registry: Arc<Mutex<Registry>>,
    root: CancellationToken,
    interval: Duration,
}

impl ReportPoller {
    pub(crate) fn new(gateway: Arc<dyn ApiGateway>, store: EntityStore) -> Self {
        Self {
            gateway,
            store,
            registry: Arc::new(Mutex::new(Registry::default())),
            root: CancellationToken::new(),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Starts polling a report, immediately issuing the first status check.
    ///
    /// Idempotent per report: calling `start` while a chain is already
    /// running for the same report spawns nothing.
    pub fn start(&self, report_id: Uuid) {
        let (chain_id, cancel) = {
            let mut registry = self.registry.lock().expect("poller registry poisoned");
            if registry.chains.contains_key(&report_id) {
                tracing::debug!(
                    target: TRACING_TARGET,
                    report_id = %report_id,
                    "Poll chain already running"
                );
                return;
            }
            registry.settled.remove(&report_id);
            registry.next_chain += 1;
            let chain = Chain {
                id: registry.next_chain,
                cancel: self.root.child_token(),
            };
            let handle = (chain.id, chain.cancel.clone());
            registry.chains.insert(report_id, chain);
            handle
        };

        tracing::debug!(
            target: TRACING_TARGET,
            report_id = %report_id,
            "Starting poll chain"
        );

        let poller = self.clone();
        tokio::spawn(async move {
            poller.run_chain(report_id, chain_id, cancel).await;
        });
    }

    /// Cancels the chain for one report, if any.
    pub fn stop(&self, report_id: Uuid) {
        let mut registry = self.registry.lock().expect("poller registry poisoned");
        if let Some(chain) = registry.chains.remove(&report_id) {
            chain.cancel.cancel();
            tracing::debug!(
                target: TRACING_TARGET,
                report_id = %report_id,
                "Stopped poll chain"
            );
        }
    }

    /// Cancels every chain. Terminal: chains started afterwards die
    /// immediately. Call on consumer teardown.
    pub fn shutdown(&self) {
        tracing::debug!(target: TRACING_TARGET, "Shutting down poller");
        self.root.cancel();
    }

    /// Returns the chain state for a report.
    pub fn state(&self, report_id: Uuid) -> PollState {
        let registry = self.registry.lock().expect("poller registry poisoned");
        if registry.chains.contains_key(&report_id) {
            PollState::Polling
        } else if registry.settled.contains(&report_id) {
            PollState::Settled
        } else {
            PollState::Idle
        }
    }

    async fn run_chain(&self, report_id: Uuid, chain_id: u64, cancel: CancellationToken) {
        let mut scheduled_followup = false;
        loop {
            if cancel.is_cancelled() {
                break;
            }

            let pending = match self.check(report_id).await {
                Ok(pending) => pending,
                Err(error) => {
                    // Soft failure: no retry, no error slot, chain ends.
                    tracing::warn!(
                        target: TRACING_TARGET,
                        report_id = %report_id,
                        error = %error,
                        "Status check failed, ending poll chain"
                    );
                    break;
                }
            };

            if pending == 0 {
                // A final full refresh only after a chain that actually
                // polled; a single incidental check settles quietly.
                if scheduled_followup && !cancel.is_cancelled() {
                    if let Err(error) = self.check(report_id).await {
                        tracing::warn!(
                            target: TRACING_TARGET,
                            report_id = %report_id,
                            error = %error,
                            "Final refresh failed"
                        );
                    }
                }
                self.settle(report_id, chain_id);
                tracing::debug!(
                    target: TRACING_TARGET,
                    report_id = %report_id,
                    "Report settled"
                );
                return;
            }

            scheduled_followup = true;
            tracing::debug!(
                target: TRACING_TARGET,
                report_id = %report_id,
                pending,
                delay_ms = self.interval.as_millis() as u64,
                "Scheduling follow-up status check"
            );
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        self.forget(report_id, chain_id);
    }

    async fn check(&self, report_id: Uuid) -> ApiResult<usize> {
        let path = format!("/cross-resource-reports/{report_id}?include_analyses=true");
        let report: AnalysisReport = self.gateway.get(&path).await.and_then(decode_payload)?;
        let pending = report.pending_count();
        self.store.apply(StoreEvent::ReportLoaded { report });
        Ok(pending)
    }

    /// Marks the report settled, but only if this chain still owns the
    /// registry entry (a stopped chain finishing late must not settle).
    fn settle(&self, report_id: Uuid, chain_id: u64) {
        let mut registry = self.registry.lock().expect("poller registry poisoned");
        if registry
            .chains
            .get(&report_id)
            .is_some_and(|chain| chain.id == chain_id)
        {
            registry.chains.remove(&report_id);
            registry.settled.insert(report_id);
        }
    }

    /// Removes the chain entry after an error or cancellation, returning
    /// the report to Idle.
    fn forget(&self, report_id: Uuid, chain_id: u64) {
        let mut registry = self.registry.lock().expect("poller registry poisoned");
        if registry
            .chains
            .get(&report_id)
            .is_some_and(|chain| chain.id == chain_id)
        {
            registry.chains.remove(&report_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use syntra_core::ApiError;
    use syntra_core::types::AnalysisStatus;
    use syntra_test::{MockGateway, sample};
    use uuid::Uuid;

    use super::*;

    fn poller(mock: &MockGateway) -> (ReportPoller, EntityStore) {
        let store = EntityStore::new();
        (
            ReportPoller::new(Arc::new(mock.clone()), store.clone()),
            store,
        )
    }

    fn report_path(report_id: Uuid) -> String {
        format!("/cross-resource-reports/{report_id}?include_analyses=true")
    }

    async fn wait_for_requests(mock: &MockGateway, count: usize) {
        for _ in 0..512 {
            if mock.request_count() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!(
            "mock never reached {count} requests (got {})",
            mock.request_count()
        );
    }

    async fn drain_tasks() {
        for _ in 0..64 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_settled_report_checks_once() {
        let mock = MockGateway::new();
        let (poller, store) = poller(&mock);
        let report_id = Uuid::now_v7();

        mock.stick(
            "GET",
            &report_path(report_id),
            Ok(sample::payload(&sample::report(
                report_id,
                &[AnalysisStatus::Completed, AnalysisStatus::Completed],
            ))),
        );

        assert_eq!(poller.state(report_id), PollState::Idle);
        poller.start(report_id);
        wait_for_requests(&mock, 1).await;
        drain_tasks().await;

        // Zero follow-ups and no final refresh for an incidental check.
        tokio::time::advance(Duration::from_secs(30)).await;
        drain_tasks().await;
        assert_eq!(mock.request_count(), 1);
        assert_eq!(poller.state(report_id), PollState::Settled);
        assert!(store.snapshot().reports.contains_key(&report_id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_report_schedules_followup_at_fixed_delay() {
        let mock = MockGateway::new();
        let (poller, _store) = poller(&mock);
        let report_id = Uuid::now_v7();
        let path = report_path(report_id);

        mock.expect(
            "GET",
            &path,
            Ok(sample::payload(&sample::report(
                report_id,
                &[AnalysisStatus::Pending, AnalysisStatus::Completed],
            ))),
        );
        mock.stick(
            "GET",
            &path,
            Ok(sample::payload(&sample::report(
                report_id,
                &[AnalysisStatus::Completed, AnalysisStatus::Completed],
            ))),
        );

        poller.start(report_id);
        wait_for_requests(&mock, 1).await;
        drain_tasks().await;
        assert_eq!(poller.state(report_id), PollState::Polling);

        // Nothing fires before the fixed delay elapses.
        tokio::time::advance(Duration::from_millis(4_999)).await;
        drain_tasks().await;
        assert_eq!(mock.request_count(), 1);

        // At +5000ms the follow-up runs, settles, and triggers exactly one
        // final refresh.
        tokio::time::advance(Duration::from_millis(1)).await;
        wait_for_requests(&mock, 3).await;
        drain_tasks().await;
        assert_eq!(mock.request_count(), 3);
        assert_eq!(poller.state(report_id), PollState::Settled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chain_repeats_until_pending_reaches_zero() {
        let mock = MockGateway::new();
        let (poller, _store) = poller(&mock);
        let report_id = Uuid::now_v7();
        let path = report_path(report_id);

        for _ in 0..3 {
            mock.expect(
                "GET",
                &path,
                Ok(sample::payload(&sample::report(
                    report_id,
                    &[AnalysisStatus::Pending],
                ))),
            );
        }
        mock.stick(
            "GET",
            &path,
            Ok(sample::payload(&sample::report(
                report_id,
                &[AnalysisStatus::Completed],
            ))),
        );

        poller.start(report_id);
        wait_for_requests(&mock, 1).await;

        for expected in 2..=4 {
            // Let the chain reach its scheduled sleep before advancing.
            drain_tasks().await;
            tokio::time::advance(Duration::from_secs(5)).await;
            wait_for_requests(&mock, expected).await;
        }
        drain_tasks().await;

        // Three pending checks, the settling check, one final refresh.
        assert_eq!(mock.request_count(), 5);
        assert_eq!(poller.state(report_id), PollState::Settled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_scheduled_followup() {
        let mock = MockGateway::new();
        let (poller, _store) = poller(&mock);
        let report_id = Uuid::now_v7();

        mock.stick(
            "GET",
            &report_path(report_id),
            Ok(sample::payload(&sample::report(
                report_id,
                &[AnalysisStatus::Pending],
            ))),
        );

        poller.start(report_id);
        wait_for_requests(&mock, 1).await;
        drain_tasks().await;
        assert_eq!(poller.state(report_id), PollState::Polling);

        poller.stop(report_id);
        assert_eq!(poller.state(report_id), PollState::Idle);

        // The cancelled timer never fires into the torn-down consumer.
        tokio::time::advance(Duration::from_secs(60)).await;
        drain_tasks().await;
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent_per_report() {
        let mock = MockGateway::new();
        let (poller, _store) = poller(&mock);
        let report_id = Uuid::now_v7();

        mock.stick(
            "GET",
            &report_path(report_id),
            Ok(sample::payload(&sample::report(
                report_id,
                &[AnalysisStatus::Pending],
            ))),
        );

        poller.start(report_id);
        poller.start(report_id);
        wait_for_requests(&mock, 1).await;
        drain_tasks().await;

        // A second chain would have issued a second immediate check.
        assert_eq!(mock.request_count(), 1);

        tokio::time::advance(Duration::from_secs(5)).await;
        wait_for_requests(&mock, 2).await;
        drain_tasks().await;
        assert_eq!(mock.request_count(), 2);

        poller.stop(report_id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_check_ends_chain_silently() {
        let mock = MockGateway::new();
        let (poller, store) = poller(&mock);
        let report_id = Uuid::now_v7();

        mock.expect(
            "GET",
            &report_path(report_id),
            Err(ApiError::http(500, "status check failed")),
        );

        poller.start(report_id);
        wait_for_requests(&mock, 1).await;
        drain_tasks().await;

        tokio::time::advance(Duration::from_secs(30)).await;
        drain_tasks().await;

        // No retry, and no error slot written: a soft failure.
        assert_eq!(mock.request_count(), 1);
        assert_eq!(poller.state(report_id), PollState::Idle);
        let state = store.snapshot();
        assert!(state.error.is_none());
        assert!(state.resource_error.is_none());
        assert!(state.selection_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_final_refresh_still_settles() {
        let mock = MockGateway::new();
        let (poller, _store) = poller(&mock);
        let report_id = Uuid::now_v7();
        let path = report_path(report_id);

        mock.expect(
            "GET",
            &path,
            Ok(sample::payload(&sample::report(
                report_id,
                &[AnalysisStatus::Pending],
            ))),
        );
        mock.expect(
            "GET",
            &path,
            Ok(sample::payload(&sample::report(
                report_id,
                &[AnalysisStatus::Completed],
            ))),
        );
        mock.expect("GET", &path, Err(ApiError::http(500, "refresh failed")));

        poller.start(report_id);
        wait_for_requests(&mock, 1).await;
        drain_tasks().await;
        tokio::time::advance(Duration::from_secs(5)).await;
        wait_for_requests(&mock, 3).await;
        drain_tasks().await;

        assert_eq!(poller.state(report_id), PollState::Settled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_all_chains() {
        let mock = MockGateway::new();
        let (poller, _store) = poller(&mock);
        let report_a = Uuid::now_v7();
        let report_b = Uuid::now_v7();

        for report_id in [report_a, report_b] {
            mock.stick(
                "GET",
                &report_path(report_id),
                Ok(sample::payload(&sample::report(
                    report_id,
                    &[AnalysisStatus::Pending],
                ))),
            );
        }

        poller.start(report_a);
        poller.start(report_b);
        wait_for_requests(&mock, 2).await;
        drain_tasks().await;

        poller.shutdown();
        tokio::time::advance(Duration::from_secs(60)).await;
        drain_tasks().await;

        assert_eq!(mock.request_count(), 2);
        assert_eq!(poller.state(report_a), PollState::Idle);
        assert_eq!(poller.state(report_b), PollState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_settle_runs_a_fresh_chain() {
        let mock = MockGateway::new();
        let (poller, _store) = poller(&mock);
        let report_id = Uuid::now_v7();

        mock.stick(
            "GET",
            &report_path(report_id),
            Ok(sample::payload(&sample::report(
                report_id,
                &[AnalysisStatus::Completed],
            ))),
        );

        poller.start(report_id);
        wait_for_requests(&mock, 1).await;
        drain_tasks().await;
        assert_eq!(poller.state(report_id), PollState::Settled);

        poller.start(report_id);
        wait_for_requests(&mock, 2).await;
        drain_tasks().await;
        assert_eq!(poller.state(report_id), PollState::Settled);
    }
}
