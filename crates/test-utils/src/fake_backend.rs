use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use jobdag::errors::Result;
use jobdag::exec::{JobProcess, ProcessBackend};

/// Exit code reported by a fake process that honoured a terminate.
pub const TERMINATED_EXIT_CODE: i32 = 143;
/// Exit code reported by a fake process after a kill.
pub const KILLED_EXIT_CODE: i32 = 137;

/// Scripted behaviour of one fake job process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeBehaviour {
    pub exit_code: i32,
    /// Number of `try_wait` calls until the process reports its exit.
    pub polls: u32,
    pub ignore_terminate: bool,
}

impl FakeBehaviour {
    /// Exit with `code` on the first poll.
    pub fn exits(code: i32) -> Self {
        Self {
            exit_code: code,
            polls: 1,
            ignore_terminate: false,
        }
    }

    /// Never exit on its own.
    pub fn hangs() -> Self {
        Self {
            exit_code: 0,
            polls: u32::MAX,
            ignore_terminate: false,
        }
    }

    pub fn after_polls(mut self, polls: u32) -> Self {
        self.polls = polls.max(1);
        self
    }

    pub fn ignoring_terminate(mut self) -> Self {
        self.ignore_terminate = true;
        self
    }
}

impl Default for FakeBehaviour {
    fn default() -> Self {
        Self::exits(0)
    }
}

/// Everything the fake backend observed.
#[derive(Debug, Default)]
pub struct FakeLog {
    /// `(job, command)` in spawn order.
    pub spawned: Vec<(String, String)>,
    /// `(job, exit_code)` in exit order.
    pub exited: Vec<(String, i32)>,
    pub terminated: Vec<String>,
    pub killed: Vec<String>,
    /// Processes spawned but not yet reported as exited.
    pub running: usize,
    pub peak_running: usize,
}

impl FakeLog {
    pub fn spawned_jobs(&self) -> Vec<String> {
        self.spawned.iter().map(|(job, _)| job.clone()).collect()
    }

    pub fn was_spawned(&self, job: &str) -> bool {
        self.spawned.iter().any(|(j, _)| j == job)
    }
}

/// A process backend that never touches the OS.
///
/// Per-job behaviour is scripted up front; anything unscripted exits with
/// code 0 on its first poll.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    behaviours: HashMap<String, FakeBehaviour>,
    default: FakeBehaviour,
    spawn_failures: HashSet<String>,
    log: Arc<Mutex<FakeLog>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_job(mut self, job: &str, behaviour: FakeBehaviour) -> Self {
        self.behaviours.insert(job.to_string(), behaviour);
        self
    }

    pub fn with_default(mut self, behaviour: FakeBehaviour) -> Self {
        self.default = behaviour;
        self
    }

    /// Make spawning this job fail.
    pub fn failing_spawn(mut self, job: &str) -> Self {
        self.spawn_failures.insert(job.to_string());
        self
    }

    /// Shared log; keep a clone before handing the backend to a scheduler.
    pub fn log(&self) -> Arc<Mutex<FakeLog>> {
        Arc::clone(&self.log)
    }
}

impl ProcessBackend for FakeBackend {
    fn spawn(&mut self, job: &str, command: &str) -> Result<Box<dyn JobProcess>> {
        if self.spawn_failures.contains(job) {
            return Err(anyhow!("fake spawn failure for job '{job}'").into());
        }

        let behaviour = self.behaviours.get(job).copied().unwrap_or(self.default);

        {
            let mut log = self.log.lock().unwrap();
            log.spawned.push((job.to_string(), command.to_string()));
            log.running += 1;
            log.peak_running = log.peak_running.max(log.running);
        }

        Ok(Box::new(FakeProcess {
            job: job.to_string(),
            remaining_polls: behaviour.polls,
            exit_code: behaviour.exit_code,
            ignore_terminate: behaviour.ignore_terminate,
            exited: false,
            log: Arc::clone(&self.log),
        }))
    }
}

struct FakeProcess {
    job: String,
    remaining_polls: u32,
    exit_code: i32,
    ignore_terminate: bool,
    exited: bool,
    log: Arc<Mutex<FakeLog>>,
}

impl JobProcess for FakeProcess {
    fn pid(&self) -> Option<u32> {
        None
    }

    fn try_wait(&mut self) -> Result<Option<i32>> {
        if self.exited {
            return Ok(Some(self.exit_code));
        }

        self.remaining_polls = self.remaining_polls.saturating_sub(1);
        if self.remaining_polls > 0 {
            return Ok(None);
        }

        self.exited = true;
        let mut log = self.log.lock().unwrap();
        log.running -= 1;
        log.exited.push((self.job.clone(), self.exit_code));
        Ok(Some(self.exit_code))
    }

    fn terminate(&mut self) -> Result<()> {
        self.log.lock().unwrap().terminated.push(self.job.clone());
        if !self.ignore_terminate {
            self.remaining_polls = 1;
            self.exit_code = TERMINATED_EXIT_CODE;
        }
        Ok(())
    }

    fn kill(&mut self) -> Result<()> {
        self.log.lock().unwrap().killed.push(self.job.clone());
        self.remaining_polls = 1;
        self.exit_code = KILLED_EXIT_CODE;
        Ok(())
    }
}
