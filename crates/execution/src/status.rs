//! Execution-level status tracking.

use serde::{Deserialize, Serialize};

/// The overall status of a workflow execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Created but not yet stepped.
    Queued,
    /// Actively stepping through nodes.
    Running,
    /// Paused at a breakpoint, waiting for a resume/step/abort control request.
    Paused,
    /// Reached an `end` node or a dead end with no outgoing edge.
    Completed,
    /// A node failed and the run loop could not continue.
    Failed,
    /// Aborted from a paused state by an explicit control request.
    Aborted,
}

impl ExecutionStatus {
    /// Returns `true` if the execution has reached a final state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Aborted)
    }

    /// Returns `true` if the execution is actively stepping.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns `true` if a `resume`/`step`/`abort` control request is meaningful.
    #[must_use]
    pub fn is_paused(self) -> bool {
        matches!(self, Self::Paused)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(ExecutionStatus::Completed.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(ExecutionStatus::Aborted.is_terminal());
        assert!(!ExecutionStatus::Queued.is_terminal());
        assert!(!ExecutionStatus::Running.is_terminal());
        assert!(!ExecutionStatus::Paused.is_terminal());
    }

    #[test]
    fn serde_rename_snake_case() {
        assert_eq!(
            serde_json::to_string(&ExecutionStatus::Paused).unwrap(),
            "\"paused\""
        );
        assert_eq!(
            serde_json::to_string(&ExecutionStatus::Aborted).unwrap(),
            "\"aborted\""
        );
    }

    #[test]
    fn serde_roundtrip() {
        for status in [
            ExecutionStatus::Queued,
            ExecutionStatus::Running,
            ExecutionStatus::Paused,
            ExecutionStatus::Completed,
            ExecutionStatus::Failed,
            ExecutionStatus::Aborted,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let back: ExecutionStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, back);
        }
    }

    #[test]
    fn display_formatting() {
        assert_eq!(ExecutionStatus::Queued.to_string(), "queued");
        assert_eq!(ExecutionStatus::Aborted.to_string(), "aborted");
    }
}
