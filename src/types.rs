// src/types.rs

//! Small shared types used by both the graph and the scheduler.

use std::fmt;

/// Canonical job identifier type.
pub type JobId = String;

/// Lifecycle state of a job in the dependency graph.
///
/// `Pending` and `Ready` are the only non-terminal states a job can be
/// waiting in; once a job leaves them it never returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    /// At least one dependency has not succeeded yet.
    Pending,
    /// All dependencies succeeded; waiting for a worker slot.
    Ready,
    /// Dispatched; a process is alive for this job.
    Running,
    /// Exited with code 0 (or had no command).
    Succeeded,
    /// Exited with a non-zero code.
    Failed,
    /// Never ran because a dependency failed or was skipped.
    Skipped,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Skipped
        )
    }

    /// Terminal states that poison dependents.
    pub fn is_unsuccessful(self) -> bool {
        matches!(self, JobState::Failed | JobState::Skipped)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Pending => "pending",
            JobState::Ready => "ready",
            JobState::Running => "running",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
            JobState::Skipped => "skipped",
        };
        f.write_str(s)
    }
}
