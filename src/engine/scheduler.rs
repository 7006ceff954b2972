// src/engine/scheduler.rs

use std::fmt;

use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, warn};

use crate::dag::DependencyGraph;
use crate::engine::handle::SchedulerHandle;
use crate::engine::options::{SchedulerOptions, TEST_MODE_COMMAND};
use crate::engine::report::{RunReport, ShutdownReport};
use crate::engine::running::{RunningJob, RunningSet};
use crate::engine::shutdown::Escalation;
use crate::engine::Submission;
use crate::errors::{JobdagError, Result};
use crate::exec::{ProcessBackend, UNKNOWN_EXIT_CODE};
use crate::types::JobId;

/// Drives the dependency graph from a single cooperative control loop.
///
/// Each iteration:
/// 1. drains queued submissions into the graph without blocking,
/// 2. dispatches at most one ready job if the running set has room,
/// 3. reaps exited processes and reports their exit codes to the graph,
/// 4. sleeps for `poll_interval` if nothing happened.
///
/// The graph is owned by the loop and never shared, so no locking is needed.
/// A `Stop` submission, a malformed graph, or (with `exit_when_idle`) a
/// finished graph ends the loop and starts the shutdown drain.
pub struct Scheduler<B: ProcessBackend> {
    graph: DependencyGraph,
    running: RunningSet,
    backend: B,
    options: SchedulerOptions,
    submissions: mpsc::UnboundedReceiver<Submission>,
    shutdown_requested: bool,
    /// Every `SchedulerHandle` has been dropped.
    producers_gone: bool,
    /// First unrecoverable graph error, returned from `run`.
    fatal: Option<JobdagError>,
    peak_running: usize,
    shutdown: ShutdownReport,
}

impl<B: ProcessBackend> fmt::Debug for Scheduler<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("graph", &self.graph)
            .field("running", &self.running.len())
            .field("options", &self.options)
            .field("shutdown_requested", &self.shutdown_requested)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> Scheduler<B> {
    /// Create a scheduler with its own submission channel.
    pub fn new(options: SchedulerOptions, backend: B) -> (Self, SchedulerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();

        let scheduler = Self {
            graph: DependencyGraph::new(),
            running: RunningSet::new(),
            backend,
            options,
            submissions: rx,
            shutdown_requested: false,
            producers_gone: false,
            fatal: None,
            peak_running: 0,
            shutdown: ShutdownReport::default(),
        };

        (scheduler, SchedulerHandle::new(tx))
    }

    /// Run until stopped, then drain running processes.
    ///
    /// Returns the fatal graph error, if any, once the drain has finished.
    pub async fn run(mut self) -> Result<RunReport> {
        info!(
            max_concurrency = self.options.max_concurrency,
            shutdown_timeout = ?self.options.shutdown_timeout,
            test_mode = self.options.test_mode,
            "scheduler started"
        );

        while !self.shutdown_requested {
            let mut progressed = self.drain_submissions();

            if !self.shutdown_requested {
                progressed |= self.dispatch_one();
            }

            progressed |= self.reap();

            if !self.shutdown_requested && self.is_idle_and_done() {
                info!(jobs = self.graph.len(), "all submitted jobs finished");
                break;
            }

            if !progressed && !self.shutdown_requested {
                sleep(self.options.poll_interval).await;
            }
        }

        self.drain_on_shutdown().await;

        // Refuse late submissions from here on.
        self.submissions.close();

        let report = RunReport::from_graph(
            &self.graph,
            self.options.max_concurrency,
            self.peak_running,
            std::mem::take(&mut self.shutdown),
        );
        report.log_summary();

        match self.fatal.take() {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }

    /// Apply every queued submission, stopping early on `Stop` or on a
    /// graph error.
    fn drain_submissions(&mut self) -> bool {
        let mut progressed = false;

        loop {
            match self.submissions.try_recv() {
                Ok(Submission::Stop) => {
                    info!("stop received; preparing to shut down");
                    self.shutdown_requested = true;
                    return true;
                }
                Ok(Submission::Job {
                    id,
                    dependencies,
                    command,
                }) => {
                    progressed = true;
                    debug!(job = %id, "job submission received");

                    if let Err(err) = self.graph.append(&id, &dependencies, command.as_deref()) {
                        error!(job = %id, error = %err, "malformed job graph; aborting run");
                        self.abort(err);
                        return true;
                    }
                }
                Err(TryRecvError::Empty) => return progressed,
                Err(TryRecvError::Disconnected) => {
                    if !self.producers_gone {
                        debug!("all scheduler handles dropped; no further submissions");
                        self.producers_gone = true;
                    }
                    return progressed;
                }
            }
        }
    }

    /// Ask the graph for one ready job if the running set has room.
    fn dispatch_one(&mut self) -> bool {
        if self.running.len() >= self.options.max_concurrency {
            return false;
        }

        let Some(job) = self.graph.next_ready() else {
            return false;
        };

        match job.command {
            None => {
                debug!(job = %job.id, "no command; completing synchronization point");
                self.record_completion(&job.id, 0);
            }
            Some(command) => self.start(job.id, command),
        }

        true
    }

    fn start(&mut self, id: JobId, command: String) {
        let command = if self.options.test_mode {
            TEST_MODE_COMMAND.to_string()
        } else {
            command
        };

        debug!(job = %id, cmd = %command, "job to run");

        match self.backend.spawn(&id, &command) {
            Ok(process) => {
                info!(job = %id, pid = ?process.pid(), "job started");
                self.running.insert(RunningJob::new(id, command, process));
                self.peak_running = self.peak_running.max(self.running.len());
            }
            Err(err) => {
                error!(job = %id, cmd = %command, error = %err, "failed to start job process");
                self.record_completion(&id, UNKNOWN_EXIT_CODE);
            }
        }
    }

    /// Remove exited processes from the running set and report them.
    fn reap(&mut self) -> bool {
        let exited = self.running.reap();
        let progressed = !exited.is_empty();

        for done in exited {
            if done.exit_code == 0 {
                info!(job = %done.id, runtime = ?done.runtime, "job succeeded");
            } else {
                error!(
                    job = %done.id,
                    exit_code = done.exit_code,
                    cmd = %done.command,
                    "command completed with error"
                );
            }
            self.record_completion(&done.id, done.exit_code);
        }

        progressed
    }

    fn record_completion(&mut self, id: &str, exit_code: i32) {
        match self.graph.complete(id, exit_code) {
            Ok(step) => {
                if !step.newly_skipped.is_empty() {
                    warn!(job = %id, skipped = ?step.newly_skipped, "dependents skipped");
                }
                if !step.newly_ready.is_empty() {
                    debug!(job = %id, ready = ?step.newly_ready, "dependents ready");
                }
            }
            Err(err) => {
                error!(job = %id, error = %err, "graph rejected completion; aborting run");
                self.abort(err);
            }
        }
    }

    fn abort(&mut self, err: JobdagError) {
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        self.shutdown_requested = true;
    }

    fn is_idle_and_done(&self) -> bool {
        let done = self.graph.is_finished() && self.running.is_empty();
        done && (self.producers_gone || self.options.exit_when_idle)
    }

    /// Reap until the running set is empty, terminating after
    /// `shutdown_timeout` and killing after twice that.
    async fn drain_on_shutdown(&mut self) {
        if self.running.is_empty() {
            info!("no running processes; shutdown complete");
            return;
        }

        info!(running = self.running.len(), "stopping all running processes");

        let timeout = self.options.shutdown_timeout;
        let started = Instant::now();

        loop {
            self.reap();
            if self.running.is_empty() {
                break;
            }

            match Escalation::at(started.elapsed(), timeout) {
                Escalation::Drain => {}
                Escalation::Terminate => {
                    let ids = self.running.terminate_all(timeout);
                    self.shutdown.terminated.extend(ids);
                }
                Escalation::Kill => {
                    let ids = self.running.kill_all(timeout);
                    self.shutdown.killed.extend(ids);
                }
            }

            sleep(self.options.poll_interval).await;
        }

        info!(elapsed = ?started.elapsed(), "all running processes stopped");
    }
}
