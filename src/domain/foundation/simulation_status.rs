//! SimulationStatus enum for tracking an experiment's simulation lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of an experiment's simulation run.
///
/// ```text
/// NotRun ──► Running ──► Completed ◄── PartialFailure
///               ▲  └──────────────────────►┘
///               └──── Completed (re-run)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    #[default]
    NotRun,
    Running,
    /// At least one persona permanently failed; insights are still pending.
    PartialFailure,
    Completed,
}

impl SimulationStatus {
    /// Returns true while model calls may still be in flight.
    pub fn is_running(&self) -> bool {
        matches!(self, SimulationStatus::Running)
    }
}

impl StateMachine for SimulationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SimulationStatus::*;
        matches!(
            (self, target),
            (NotRun, Running)
                | (Running, Completed)
                | (Running, PartialFailure)
                | (PartialFailure, Completed)
                | (Completed, Running)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SimulationStatus::*;
        match self {
            NotRun => vec![Running],
            Running => vec![Completed, PartialFailure],
            PartialFailure => vec![Completed],
            Completed => vec![Running],
        }
    }
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SimulationStatus::NotRun => "NOT_RUN",
            SimulationStatus::Running => "RUNNING",
            SimulationStatus::PartialFailure => "PARTIAL_FAILURE",
            SimulationStatus::Completed => "COMPLETED",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_run() {
        assert_eq!(SimulationStatus::default(), SimulationStatus::NotRun);
    }

    #[test]
    fn not_run_can_only_start_running() {
        assert!(SimulationStatus::NotRun.can_transition_to(&SimulationStatus::Running));
        assert!(!SimulationStatus::NotRun.can_transition_to(&SimulationStatus::Completed));
    }

    #[test]
    fn running_reaches_completed_directly_or_via_partial_failure() {
        assert!(SimulationStatus::Running.can_transition_to(&SimulationStatus::Completed));
        assert!(SimulationStatus::Running.can_transition_to(&SimulationStatus::PartialFailure));
        assert!(SimulationStatus::PartialFailure.can_transition_to(&SimulationStatus::Completed));
    }

    #[test]
    fn partial_failure_cannot_restart_without_completing() {
        assert!(SimulationStatus::PartialFailure
            .transition_to(SimulationStatus::Running)
            .is_err());
    }

    #[test]
    fn completed_can_be_rerun() {
        assert!(SimulationStatus::Completed.can_transition_to(&SimulationStatus::Running));
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        use SimulationStatus::*;
        for status in [NotRun, Running, PartialFailure, Completed] {
            for target in status.valid_transitions() {
                assert!(status.can_transition_to(&target));
            }
        }
    }

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(
            serde_json::to_string(&SimulationStatus::PartialFailure).unwrap(),
            "\"partial_failure\""
        );
    }

    #[test]
    fn display_uses_upper_snake_case() {
        assert_eq!(SimulationStatus::NotRun.to_string(), "NOT_RUN");
        assert_eq!(SimulationStatus::PartialFailure.to_string(), "PARTIAL_FAILURE");
    }
}
