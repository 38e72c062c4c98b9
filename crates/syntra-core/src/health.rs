//! Health reporting for gateway implementations.

use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Operational status of the backend as seen by a gateway.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// The backend is reachable and responding normally.
    #[default]
    Healthy,
    /// The backend is reachable but responding with errors.
    Degraded,
    /// The backend is unreachable.
    Unhealthy,
}

/// Result of a gateway health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Current backend status.
    pub status: ServiceStatus,
    /// Optional message describing the current state.
    pub message: Option<String>,
    /// Round-trip latency of the health probe.
    pub latency: Option<Duration>,
    /// Timestamp when the check was performed.
    pub checked_at: Timestamp,
}

impl ServiceHealth {
    /// Creates a healthy report.
    pub fn healthy() -> Self {
        Self {
            status: ServiceStatus::Healthy,
            message: None,
            latency: None,
            checked_at: Timestamp::now(),
        }
    }

    /// Creates a degraded report with a message.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Degraded,
            message: Some(message.into()),
            latency: None,
            checked_at: Timestamp::now(),
        }
    }

    /// Creates an unhealthy report with a message.
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Unhealthy,
            message: Some(message.into()),
            latency: None,
            checked_at: Timestamp::now(),
        }
    }

    /// Sets the probe latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns whether the backend is usable at all.
    pub fn is_available(&self) -> bool {
        self.status != ServiceStatus::Unhealthy
    }
}
