// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The scheduler talks to a `ProcessBackend` instead of spawning OS
//! processes directly. This makes it easy to swap in a fake backend in tests
//! while keeping the production implementation in [`shell`](super::shell).
//!
//! Every method is non-blocking: the scheduler polls its running set from a
//! single control loop and must never wait on one particular child.

use crate::errors::Result;

/// Handle to one started job process.
pub trait JobProcess: Send {
    /// OS process id, if the process is (still) known to the OS.
    fn pid(&self) -> Option<u32>;

    /// Non-blocking exit check: `Ok(None)` while the process is alive,
    /// `Ok(Some(code))` once it has exited.
    fn try_wait(&mut self) -> Result<Option<i32>>;

    /// Ask the process to stop gracefully (SIGTERM on Unix).
    fn terminate(&mut self) -> Result<()>;

    /// Force the process to stop (SIGKILL on Unix).
    fn kill(&mut self) -> Result<()>;
}

/// Trait abstracting how job commands are started.
///
/// Production code uses [`ShellBackend`](super::ShellBackend); tests can
/// provide an implementation that doesn't spawn real processes.
pub trait ProcessBackend: Send {
    fn spawn(&mut self, job: &str, command: &str) -> Result<Box<dyn JobProcess>>;
}

impl<B: ProcessBackend + ?Sized> ProcessBackend for Box<B> {
    fn spawn(&mut self, job: &str, command: &str) -> Result<Box<dyn JobProcess>> {
        (**self).spawn(job, command)
    }
}
