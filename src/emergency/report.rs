use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::hardware::HardwareError;
use crate::pattern::PatternOutcome;

use super::EmergencyStatus;

/// What happened to one resource during an activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "error")]
pub enum ResourceStatus {
    Ok,
    Unavailable,
    Skipped,
    Failed(HardwareError),
}

impl ResourceStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ResourceStatus::Ok)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationReport {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub torch: ResourceStatus,
    pub vibration: ResourceStatus,
    pub volume: ResourceStatus,
}

impl ActivationReport {
    /// True when every present resource came up.
    pub fn is_complete(&self) -> bool {
        [&self.torch, &self.vibration, &self.volume]
            .iter()
            .all(|status| !matches!(status, ResourceStatus::Failed(_)))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ActivationOutcome {
    Started(ActivationReport),
    AlreadyActive { status: EmergencyStatus },
}

impl ActivationOutcome {
    pub fn report(&self) -> Option<&ActivationReport> {
        match self {
            ActivationOutcome::Started(report) => Some(report),
            ActivationOutcome::AlreadyActive { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivationReport {
    pub was_active: bool,
    pub session_id: Option<String>,
    pub pattern_outcomes: Vec<PatternOutcome>,
    pub cancellation_timeouts: usize,
    pub restored_volume: Option<i32>,
    pub torch_off: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangedEvent {
    pub status: EmergencyStatus,
    pub session_id: Option<String>,
    pub at: DateTime<Utc>,
}
