// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::duration::parse_duration;
use crate::config::model::{JobsFile, RawJobsFile, SchedulerSection};
use crate::engine::SchedulerOptions;
use crate::errors::{JobdagError, Result};

/// Load a jobs file from a given path and return the raw `RawJobsFile`.
///
/// This only performs TOML deserialization; it does **not** check the job
/// graph. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawJobsFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    load_from_str(&contents)
}

pub fn load_from_str(contents: &str) -> Result<RawJobsFile> {
    let raw: RawJobsFile = toml::from_str(contents)?;
    Ok(raw)
}

/// Load a jobs file from path and validate it.
///
/// - Reads TOML and applies defaults.
/// - Checks for unknown or self `after` references and cycles.
/// - Checks `[scheduler]` values.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<JobsFile> {
    let raw = load_from_path(&path)?;
    JobsFile::try_from(raw)
}

impl SchedulerSection {
    /// Build scheduler options for this host.
    ///
    /// The core check always runs, even with an explicit `max_concurrency`.
    pub fn to_options(&self) -> Result<SchedulerOptions> {
        let mut options = SchedulerOptions::detect()?;
        if let Some(max) = self.max_concurrency {
            options = options.max_concurrency(max)?;
        }

        let shutdown_timeout = parse_duration(&self.shutdown_timeout).map_err(|e| {
            JobdagError::ConfigError(format!("[scheduler].shutdown_timeout: {e}"))
        })?;
        let poll_interval = parse_duration(&self.poll_interval)
            .map_err(|e| JobdagError::ConfigError(format!("[scheduler].poll_interval: {e}")))?;

        Ok(options
            .shutdown_timeout(shutdown_timeout)
            .poll_interval(poll_interval)
            .test_mode(self.test_mode))
    }
}
