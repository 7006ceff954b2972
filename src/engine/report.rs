// src/engine/report.rs

//! Final per-job results of a scheduling run.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::dag::{DependencyGraph, JobCounts};
use crate::types::{JobId, JobState};

/// Final state of a single job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOutcome {
    pub state: JobState,
    pub exit_code: Option<i32>,
}

/// Jobs affected by shutdown escalation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Jobs that received a graceful terminate.
    pub terminated: Vec<JobId>,
    /// Jobs that were force-killed.
    pub killed: Vec<JobId>,
}

/// Summary of a finished scheduling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub jobs: BTreeMap<JobId, JobOutcome>,
    pub counts: JobCounts,
    pub max_concurrency: usize,
    /// Largest running-set size observed during the run.
    pub peak_running: usize,
    pub shutdown: ShutdownReport,
}

impl RunReport {
    pub fn from_graph(
        graph: &DependencyGraph,
        max_concurrency: usize,
        peak_running: usize,
        shutdown: ShutdownReport,
    ) -> Self {
        let jobs = graph
            .jobs()
            .map(|node| {
                (
                    node.id.clone(),
                    JobOutcome {
                        state: node.state,
                        exit_code: node.exit_code,
                    },
                )
            })
            .collect();

        Self {
            jobs,
            counts: graph.counts(),
            max_concurrency,
            peak_running,
            shutdown,
        }
    }

    pub fn state_of(&self, id: &str) -> Option<JobState> {
        self.jobs.get(id).map(|o| o.state)
    }

    pub fn exit_code_of(&self, id: &str) -> Option<i32> {
        self.jobs.get(id).and_then(|o| o.exit_code)
    }

    /// Ids of jobs that ended in `state`, sorted.
    pub fn jobs_in(&self, state: JobState) -> Vec<&str> {
        self.jobs
            .iter()
            .filter(|(_, o)| o.state == state)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.counts.succeeded == self.counts.total()
    }

    /// Whether any job failed or was skipped.
    pub fn has_failures(&self) -> bool {
        self.counts.failed > 0 || self.counts.skipped > 0
    }

    pub fn log_summary(&self) {
        let c = &self.counts;
        if self.has_failures() || c.unfinished() > 0 {
            warn!(
                succeeded = c.succeeded,
                failed = c.failed,
                skipped = c.skipped,
                not_run = c.unfinished(),
                failed_jobs = ?self.jobs_in(JobState::Failed),
                "run finished with failures"
            );
        } else {
            info!(
                succeeded = c.succeeded,
                peak_running = self.peak_running,
                "run finished; all jobs succeeded"
            );
        }
    }
}
