//! Cross-resource analysis report model.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Completion status of an analysis job or report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AnalysisStatus {
    /// Queued, not yet started.
    #[default]
    Pending,
    /// Currently running.
    InProgress,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
}

impl AnalysisStatus {
    /// Returns whether the job has reached a terminal state.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, AnalysisStatus::Completed | AnalysisStatus::Failed)
    }
}

/// A standalone analysis job run against a single resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceAnalysis {
    /// Unique analysis identifier.
    pub id: Uuid,
    /// The resource this analysis covers.
    pub resource_id: Uuid,
    /// Completion status.
    pub status: AnalysisStatus,
    /// Human-readable result summary, present once completed.
    #[serde(default)]
    pub summary: Option<String>,
    /// Timestamp when the analysis was requested.
    pub created_at: Timestamp,
    /// Timestamp when the analysis reached a terminal state.
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
}

impl ResourceAnalysis {
    /// Returns whether the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Per-resource analysis tracked inside a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAnalysis {
    /// The resource this analysis covers.
    pub resource_id: Uuid,
    /// Completion status of this analysis.
    pub status: AnalysisStatus,
}

/// A backend asynchronous computation over one or more resources.
///
/// Reports are created externally and polled until no sub-analysis remains
/// pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// Human-readable report title.
    pub title: String,
    /// Overall report status.
    pub status: AnalysisStatus,
    /// Number of resources covered by the report.
    pub resource_count: u32,
    /// Timestamp when the report was created.
    pub created_at: Timestamp,
    /// Per-resource analyses, present when fetched with `include_analyses`.
    #[serde(default)]
    pub sub_analyses: Vec<SubAnalysis>,
}

impl AnalysisReport {
    /// Counts sub-analyses still pending.
    pub fn pending_count(&self) -> usize {
        self.sub_analyses
            .iter()
            .filter(|sub| sub.status == AnalysisStatus::Pending)
            .count()
    }

    /// Returns whether no sub-analysis remains pending.
    pub fn is_settled(&self) -> bool {
        self.pending_count() == 0
    }
}
