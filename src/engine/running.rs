// src/engine/running.rs

//! Records of job processes that are currently alive.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::exec::{JobProcess, UNKNOWN_EXIT_CODE};
use crate::types::JobId;

/// One dispatched job whose process has not been reaped yet.
pub struct RunningJob {
    pub id: JobId,
    /// Command actually handed to the backend.
    pub command: String,
    pub started: Instant,
    process: Box<dyn JobProcess>,
    terminated: bool,
    killed: bool,
}

impl RunningJob {
    pub fn new(id: JobId, command: String, process: Box<dyn JobProcess>) -> Self {
        Self {
            id,
            command,
            started: Instant::now(),
            process,
            terminated: false,
            killed: false,
        }
    }
}

/// A job process that exited since the previous poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitedJob {
    pub id: JobId,
    pub command: String,
    pub exit_code: i32,
    pub runtime: Duration,
}

/// The scheduler's running set.
#[derive(Default)]
pub struct RunningSet {
    jobs: Vec<RunningJob>,
}

impl RunningSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn insert(&mut self, job: RunningJob) {
        self.jobs.push(job);
    }

    /// Non-blocking exit check on every running process.
    ///
    /// Exited jobs are removed and returned; the rest stay tracked. A process
    /// that cannot be polled is treated as exited with an unknown code.
    pub fn reap(&mut self) -> Vec<ExitedJob> {
        let mut exited = Vec::new();
        let mut still_running = Vec::with_capacity(self.jobs.len());

        for mut job in self.jobs.drain(..) {
            let code = match job.process.try_wait() {
                Ok(None) => {
                    still_running.push(job);
                    continue;
                }
                Ok(Some(code)) => code,
                Err(err) => {
                    error!(
                        job = %job.id,
                        error = %err,
                        "failed to poll job process; treating as failed"
                    );
                    UNKNOWN_EXIT_CODE
                }
            };

            debug!(job = %job.id, exit_code = code, "job process exited");
            exited.push(ExitedJob {
                runtime: job.started.elapsed(),
                id: job.id,
                command: job.command,
                exit_code: code,
            });
        }

        self.jobs = still_running;
        exited
    }

    /// Send a graceful terminate to every process not yet terminated.
    ///
    /// Returns the ids that were signalled by this call.
    pub fn terminate_all(&mut self, timeout: Duration) -> Vec<JobId> {
        let mut signalled = Vec::new();

        for job in self.jobs.iter_mut().filter(|j| !j.terminated) {
            error!(
                job = %job.id,
                timeout = ?timeout,
                cmd = %job.command,
                "terminating process after shutdown timeout"
            );
            if let Err(err) = job.process.terminate() {
                warn!(job = %job.id, error = %err, "failed to terminate job process");
            }
            job.terminated = true;
            signalled.push(job.id.clone());
        }

        signalled
    }

    /// Force-kill every process not yet killed.
    ///
    /// Returns the ids that were killed by this call.
    pub fn kill_all(&mut self, timeout: Duration) -> Vec<JobId> {
        let mut signalled = Vec::new();

        for job in self.jobs.iter_mut().filter(|j| !j.killed) {
            error!(
                job = %job.id,
                timeout = ?timeout.saturating_mul(2),
                cmd = %job.command,
                "killing process after shutdown timeout"
            );
            if let Err(err) = job.process.kill() {
                warn!(job = %job.id, error = %err, "failed to kill job process");
            }
            job.killed = true;
            signalled.push(job.id.clone());
        }

        signalled
    }
}
