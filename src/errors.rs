// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::types::{JobId, JobState};

#[derive(Error, Debug)]
pub enum JobdagError {
    #[error("duplicate job id '{0}'")]
    DuplicateJob(JobId),

    #[error("job '{job}' depends on unknown job '{dependency}'")]
    UnknownDependency { job: JobId, dependency: JobId },

    #[error("job '{0}' cannot depend on itself")]
    SelfDependency(JobId),

    #[error("cycle detected in job graph: {0}")]
    DagCycle(String),

    #[error("unknown job '{0}'")]
    UnknownJob(JobId),

    #[error("job '{job}' cannot be completed from state {state:?}")]
    InvalidTransition { job: JobId, state: JobState },

    #[error("number of available cores {0} (< 2)")]
    InsufficientCores(usize),

    #[error("scheduler is no longer accepting submissions")]
    SchedulerClosed,

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JobdagError {
    /// Whether this error describes a malformed job graph.
    ///
    /// Topology errors abort the whole run; they are never per-job failures.
    pub fn is_topology(&self) -> bool {
        matches!(
            self,
            JobdagError::DuplicateJob(_)
                | JobdagError::UnknownDependency { .. }
                | JobdagError::SelfDependency(_)
                | JobdagError::DagCycle(_)
                | JobdagError::UnknownJob(_)
                | JobdagError::InvalidTransition { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, JobdagError>;
