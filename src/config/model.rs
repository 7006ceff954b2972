// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::exec::DEFAULT_SHELL;
use crate::types::JobId;

/// Jobs file as read from TOML, before validation.
///
/// ```toml
/// [scheduler]
/// max_concurrency = 4
/// shutdown_timeout = "60s"
///
/// [job.fastqc]
/// cmd = "fastqc sample.fq"
///
/// [job.align]
/// cmd = "bwa mem ref.fa sample.fq > sample.sam"
/// after = ["fastqc"]
///
/// [job.done]
/// after = ["align"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJobsFile {
    #[serde(default)]
    pub scheduler: SchedulerSection,

    /// All jobs from `[job.<id>]`, keyed by job id.
    #[serde(default)]
    pub job: BTreeMap<JobId, JobConfig>,
}

/// `[scheduler]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchedulerSection {
    /// Explicit concurrency cap; `None` means half the available cores.
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Duration string (`"500ms"`, `"60s"`, `"2m"`).
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: String,

    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// Shell used to run every job command.
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Run `pwd` instead of each job's command.
    #[serde(default)]
    pub test_mode: bool,
}

fn default_shutdown_timeout() -> String {
    "60s".to_string()
}

fn default_poll_interval() -> String {
    "100ms".to_string()
}

fn default_shell() -> String {
    DEFAULT_SHELL.to_string()
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            shutdown_timeout: default_shutdown_timeout(),
            poll_interval: default_poll_interval(),
            shell: default_shell(),
            test_mode: false,
        }
    }
}

/// `[job.<id>]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobConfig {
    /// Command to execute; omit for a pure synchronization point.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Jobs that must succeed before this one runs.
    #[serde(default)]
    pub after: Vec<JobId>,
}

/// A validated jobs file.
///
/// Only constructible through `TryFrom<RawJobsFile>`, which guarantees that
/// every `after` entry names a known job, the graph is acyclic and all
/// durations parse.
#[derive(Debug, Clone)]
pub struct JobsFile {
    pub scheduler: SchedulerSection,
    pub job: BTreeMap<JobId, JobConfig>,
    /// Job ids in dependency order: every job after all of its `after`s.
    order: Vec<JobId>,
}

impl JobsFile {
    pub(crate) fn new_unchecked(
        scheduler: SchedulerSection,
        job: BTreeMap<JobId, JobConfig>,
        order: Vec<JobId>,
    ) -> Self {
        Self {
            scheduler,
            job,
            order,
        }
    }

    /// Jobs in an order the scheduler accepts: dependencies first.
    pub fn submission_order(&self) -> impl Iterator<Item = (&JobId, &JobConfig)> {
        self.order
            .iter()
            .filter_map(|id| self.job.get(id).map(|cfg| (id, cfg)))
    }
}
