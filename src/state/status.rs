//! Session status as seen by the outside world

use serde::{Deserialize, Serialize};

/// Projection of orchestrator and curtain state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    WorkRunning,
    BreakActive,
    Snoozed,
}

impl SessionStatus {
    /// Combine the individual flags; a snooze wait outranks everything else
    pub fn project(work_running: bool, break_active: bool, snoozed: bool) -> Self {
        if snoozed {
            Self::Snoozed
        } else if break_active {
            Self::BreakActive
        } else if work_running {
            Self::WorkRunning
        } else {
            Self::Idle
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Status snapshot handed to the status UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: SessionStatus,
    /// Seconds left on whichever countdown is active
    pub remaining_seconds: Option<u64>,
    pub work_seconds: u64,
    pub break_seconds: u64,
    pub snooze_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snooze_takes_precedence() {
        assert_eq!(SessionStatus::project(true, false, true), SessionStatus::Snoozed);
        assert_eq!(SessionStatus::project(false, true, true), SessionStatus::Snoozed);
        assert_eq!(SessionStatus::project(true, true, false), SessionStatus::BreakActive);
        assert_eq!(SessionStatus::project(true, false, false), SessionStatus::WorkRunning);
        assert!(SessionStatus::project(false, false, false).is_idle());
    }

    #[test]
    fn serializes_in_snake_case() {
        let json = serde_json::to_string(&SessionStatus::WorkRunning).unwrap();
        assert_eq!(json, "\"work_running\"");
    }
}
