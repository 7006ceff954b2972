// src/engine/handle.rs

//! Producer-facing submission API.

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::Submission;
use crate::errors::{JobdagError, Result};
use crate::types::JobId;

/// Cheap, cloneable handle for feeding a [`Scheduler`](super::Scheduler).
///
/// Both methods are non-blocking and may be called from any thread.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    tx: mpsc::UnboundedSender<Submission>,
}

impl SchedulerHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Submission>) -> Self {
        Self { tx }
    }

    /// Enqueue a job. Dependencies must have been submitted earlier.
    pub fn submit(
        &self,
        id: impl Into<JobId>,
        command: Option<String>,
        dependencies: Vec<JobId>,
    ) -> Result<()> {
        let id = id.into();
        debug!(job = %id, deps = ?dependencies, "submitting job");
        self.tx
            .send(Submission::Job {
                id,
                dependencies,
                command,
            })
            .map_err(|_| JobdagError::SchedulerClosed)
    }

    /// Ask the scheduler to shut down. Safe to call repeatedly, including
    /// after the scheduler has already finished.
    pub fn stop(&self) {
        if self.tx.send(Submission::Stop).is_err() {
            debug!("stop requested but scheduler already finished");
        }
    }

    /// Whether the scheduler has stopped receiving submissions.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
