// src/engine/mod.rs

//! Orchestration engine for jobdag.
//!
//! This module ties together:
//! - the submission channel fed by [`SchedulerHandle`]s
//! - the dependency graph
//! - the running set of job processes
//! - orderly two-stage shutdown
//!
//! The control loop lives in [`scheduler`]; [`running`] tracks live
//! processes and [`shutdown`] decides when to escalate.

use crate::types::JobId;

/// Messages flowing from producers into the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Add a job to the graph.
    Job {
        id: JobId,
        dependencies: Vec<JobId>,
        command: Option<String>,
    },
    /// Stop dispatching and drain running processes.
    Stop,
}

pub mod handle;
pub mod options;
pub mod report;
pub mod running;
pub mod scheduler;
pub mod shutdown;

pub use handle::SchedulerHandle;
pub use options::SchedulerOptions;
pub use report::{JobOutcome, RunReport, ShutdownReport};
pub use scheduler::Scheduler;
pub use shutdown::Escalation;
