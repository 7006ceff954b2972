// src/dag/job.rs

//! Job nodes stored in the dependency graph.

use crate::types::{JobId, JobState};

/// A single node of the dependency graph.
#[derive(Debug, Clone)]
pub struct JobNode {
    pub id: JobId,
    /// Shell command; `None` marks a pure synchronization point.
    pub command: Option<String>,
    /// Direct dependencies, deduplicated, in submission order.
    pub dependencies: Vec<JobId>,
    /// Direct dependents: jobs that list this one as a dependency.
    ///
    /// Grows as later jobs are appended.
    pub dependents: Vec<JobId>,
    pub state: JobState,
    /// Set on transition to `Succeeded` / `Failed`.
    pub exit_code: Option<i32>,
    /// Number of dependencies that have not succeeded yet.
    pub(crate) unmet: usize,
}

impl JobNode {
    pub(crate) fn new(id: JobId, dependencies: Vec<JobId>, command: Option<String>) -> Self {
        Self {
            id,
            command,
            dependencies,
            dependents: Vec::new(),
            state: JobState::Pending,
            exit_code: None,
            unmet: 0,
        }
    }
}

/// A job leaving the `Ready` state, as handed out by
/// [`DependencyGraph::next_ready`](crate::dag::DependencyGraph::next_ready).
///
/// - `command: Some(_)`: the job is now `Running` and must be executed.
/// - `command: None`: the job had nothing to execute and is already
///   `Succeeded`. The caller still reports completion with exit code 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyJob {
    pub id: JobId,
    pub command: Option<String>,
}

impl ReadyJob {
    pub fn is_sync_point(&self) -> bool {
        self.command.is_none()
    }
}

/// Number of jobs per state, for summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobCounts {
    pub pending: usize,
    pub ready: usize,
    pub running: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl JobCounts {
    pub(crate) fn record(&mut self, state: JobState) {
        match state {
            JobState::Pending => self.pending += 1,
            JobState::Ready => self.ready += 1,
            JobState::Running => self.running += 1,
            JobState::Succeeded => self.succeeded += 1,
            JobState::Failed => self.failed += 1,
            JobState::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.ready + self.running + self.succeeded + self.failed + self.skipped
    }

    /// Jobs that never reached a terminal state.
    pub fn unfinished(&self) -> usize {
        self.pending + self.ready + self.running
    }
}
