#![allow(dead_code)]

use std::collections::BTreeMap;

use jobdag::config::{JobConfig, JobsFile, RawJobsFile, SchedulerSection};

/// Builder for `JobsFile` to simplify test setup.
pub struct JobsFileBuilder {
    raw: RawJobsFile,
}

impl JobsFileBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawJobsFile {
                scheduler: SchedulerSection::default(),
                job: BTreeMap::new(),
            },
        }
    }

    pub fn with_job(mut self, id: &str, job: JobConfig) -> Self {
        self.raw.job.insert(id.to_string(), job);
        self
    }

    pub fn max_concurrency(mut self, max: usize) -> Self {
        self.raw.scheduler.max_concurrency = Some(max);
        self
    }

    pub fn shutdown_timeout(mut self, timeout: &str) -> Self {
        self.raw.scheduler.shutdown_timeout = timeout.to_string();
        self
    }

    pub fn raw(self) -> RawJobsFile {
        self.raw
    }

    pub fn build(self) -> JobsFile {
        JobsFile::try_from(self.raw).expect("Failed to build valid jobs file from builder")
    }
}

impl Default for JobsFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `JobConfig`.
pub struct JobConfigBuilder {
    job: JobConfig,
}

impl JobConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            job: JobConfig {
                cmd: Some(cmd.to_string()),
                after: vec![],
            },
        }
    }

    /// A job without a command.
    pub fn sync_point() -> Self {
        Self {
            job: JobConfig::default(),
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.job.after.push(dep.to_string());
        self
    }

    pub fn build(self) -> JobConfig {
        self.job
    }
}
