// src/engine/options.rs

//! Scheduler tuning: concurrency cap, shutdown timeout, poll interval.

use std::io;
use std::num::NonZeroUsize;
use std::time::Duration;

use tracing::debug;

use crate::errors::{JobdagError, Result};

/// Fewer available cores than this is a fatal configuration error.
pub const MIN_CORES: usize = 2;

pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Command substituted for every job in test mode.
pub const TEST_MODE_COMMAND: &str = "pwd";

/// Options used by the scheduler's control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Upper bound on simultaneously running job processes.
    pub max_concurrency: usize,
    /// Grace period before running processes are terminated during
    /// shutdown; they are killed after twice this long.
    pub shutdown_timeout: Duration,
    /// Sleep between idle iterations of the control loop.
    pub poll_interval: Duration,
    /// Replace every command with [`TEST_MODE_COMMAND`].
    pub test_mode: bool,
    /// Finish the run once every submitted job is terminal, nothing is
    /// running and no submission is queued.
    pub exit_when_idle: bool,
}

impl SchedulerOptions {
    /// Derive options from the cores available to this process.
    pub fn detect() -> Result<Self> {
        Self::from_parallelism(std::thread::available_parallelism())
    }

    /// Options from the result of a core-count query.
    ///
    /// A failed query is returned as [`JobdagError::IoError`].
    pub fn from_parallelism(cores: io::Result<NonZeroUsize>) -> Result<Self> {
        let cores = cores?.get();
        debug!(cores, "detected available cores");
        Self::from_cores(cores)
    }

    /// Half of the given cores may run jobs concurrently.
    pub fn from_cores(cores: usize) -> Result<Self> {
        if cores < MIN_CORES {
            return Err(JobdagError::InsufficientCores(cores));
        }

        let max_concurrency = cores / 2;
        debug!(cores, max_concurrency, "derived concurrency cap");
        Ok(Self::with_cap(max_concurrency))
    }

    /// Explicit concurrency cap, bypassing core detection.
    pub fn with_max_concurrency(max_concurrency: usize) -> Result<Self> {
        Self::with_cap(1).max_concurrency(max_concurrency)
    }

    pub fn max_concurrency(mut self, max_concurrency: usize) -> Result<Self> {
        if max_concurrency == 0 {
            return Err(JobdagError::ConfigError(
                "max_concurrency must be >= 1 (got 0)".to_string(),
            ));
        }
        self.max_concurrency = max_concurrency;
        Ok(self)
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn test_mode(mut self, enabled: bool) -> Self {
        self.test_mode = enabled;
        self
    }

    pub fn exit_when_idle(mut self, enabled: bool) -> Self {
        self.exit_when_idle = enabled;
        self
    }

    fn with_cap(max_concurrency: usize) -> Self {
        Self {
            max_concurrency,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            test_mode: false,
            exit_when_idle: false,
        }
    }
}
