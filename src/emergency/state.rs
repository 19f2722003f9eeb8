use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pattern::PatternHandle;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum EmergencyStatus {
    #[default]
    Idle,
    Activating,
    Active,
    Deactivating,
}

impl EmergencyStatus {
    /// Anything but `Idle`: the alert is starting, running or still winding
    /// down.
    pub fn is_engaged(self) -> bool {
        !matches!(self, EmergencyStatus::Idle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EmergencyStatus::Idle => "idle",
            EmergencyStatus::Activating => "activating",
            EmergencyStatus::Active => "active",
            EmergencyStatus::Deactivating => "deactivating",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencySnapshot {
    pub status: EmergencyStatus,
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub saved_volume_level: Option<i32>,
    pub running_patterns: usize,
}

/// Mutable state of the one alert a coordinator can run.
#[derive(Default)]
pub struct EmergencySession {
    pub status: EmergencyStatus,
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    /// Ring level seen before the alert raised it. `Some` only while a raise
    /// is outstanding; survives `end()` when the restore failed.
    pub saved_volume_level: Option<i32>,
    pub pattern_tasks: Vec<PatternHandle>,
}

impl EmergencySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, session_id: String, started_at: DateTime<Utc>) {
        self.status = EmergencyStatus::Activating;
        self.session_id = Some(session_id);
        self.started_at = Some(started_at);
        self.pattern_tasks.clear();
    }

    /// Record the pre-alert ring level unless one is already held.
    /// Returns whether the level was stored.
    pub fn save_volume(&mut self, level: i32) -> bool {
        if self.saved_volume_level.is_some() {
            return false;
        }
        self.saved_volume_level = Some(level);
        true
    }

    pub fn end(&mut self) {
        let saved_volume_level = self.saved_volume_level.take();
        *self = Self {
            saved_volume_level,
            ..Self::default()
        };
    }

    pub fn snapshot(&self) -> EmergencySnapshot {
        EmergencySnapshot {
            status: self.status,
            session_id: self.session_id.clone(),
            started_at: self.started_at,
            saved_volume_level: self.saved_volume_level,
            running_patterns: self
                .pattern_tasks
                .iter()
                .filter(|task| !task.is_finished())
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_is_disengaged() {
        assert!(!EmergencyStatus::Idle.is_engaged());
        assert!(EmergencyStatus::Activating.is_engaged());
        assert!(EmergencyStatus::Active.is_engaged());
        assert!(EmergencyStatus::Deactivating.is_engaged());
    }

    #[test]
    fn second_save_keeps_the_original_level() {
        let mut session = EmergencySession::new();
        assert!(session.save_volume(3));
        assert!(!session.save_volume(15));
        assert_eq!(session.saved_volume_level, Some(3));
    }

    #[test]
    fn end_resets_everything_but_an_unrestored_level() {
        let mut session = EmergencySession::new();
        session.begin("abc".into(), Utc::now());
        session.save_volume(4);
        session.end();

        assert_eq!(session.status, EmergencyStatus::Idle);
        assert!(session.session_id.is_none());
        assert!(session.started_at.is_none());
        assert_eq!(session.saved_volume_level, Some(4));
    }
}
