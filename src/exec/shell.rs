// src/exec/shell.rs

//! Real process backend: runs each job command through a shell.

use std::process::{ExitStatus, Stdio};

use anyhow::{Context, anyhow};
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::backend::{JobProcess, ProcessBackend};
use crate::types::JobId;

/// Shell used when none is configured.
pub const DEFAULT_SHELL: &str = if cfg!(windows) { "cmd" } else { "bash" };

/// Exit code reported when a process status carries no code at all.
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// Spawns `<shell> -c <command>` (or `cmd /C <command>` on Windows) for every
/// job, inheriting the scheduler's environment and stdio.
///
/// The shell is started non-interactively so it never competes with the
/// scheduler for the terminal's stdin or SIGINT.
#[derive(Debug, Clone)]
pub struct ShellBackend {
    shell: String,
}

impl ShellBackend {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    fn command_flag(&self) -> &'static str {
        let name = self.shell.to_ascii_lowercase();
        if name.ends_with("cmd") || name.ends_with("cmd.exe") {
            "/C"
        } else {
            "-c"
        }
    }
}

impl Default for ShellBackend {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

impl ProcessBackend for ShellBackend {
    fn spawn(&mut self, job: &str, command: &str) -> Result<Box<dyn JobProcess>> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg(self.command_flag())
            .arg(command)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("spawning process for job '{job}' with shell '{}'", self.shell))?;

        debug!(job = %job, pid = ?child.id(), shell = %self.shell, "spawned job process");

        Ok(Box::new(ShellProcess {
            job: job.to_string(),
            child,
        }))
    }
}

/// A running shell process for one job.
#[derive(Debug)]
pub struct ShellProcess {
    job: JobId,
    child: Child,
}

impl JobProcess for ShellProcess {
    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    fn try_wait(&mut self) -> Result<Option<i32>> {
        let status = self
            .child
            .try_wait()
            .with_context(|| format!("polling process of job '{}'", self.job))?;
        Ok(status.map(exit_code))
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> Result<()> {
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        send_signal(pid, "TERM")
            .with_context(|| format!("terminating process of job '{}'", self.job))?;
        info!(job = %self.job, pid, "sent SIGTERM");
        Ok(())
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> Result<()> {
        self.kill()
    }

    fn kill(&mut self) -> Result<()> {
        let pid = self.child.id();
        self.child
            .start_kill()
            .with_context(|| format!("killing process of job '{}'", self.job))?;
        info!(job = %self.job, pid = ?pid, "sent kill signal");
        Ok(())
    }
}

/// Deliver `signal` (e.g. `"TERM"`) to `pid` with the `kill` utility.
///
/// Runs on the control loop; `kill` returns as soon as the signal is queued.
#[cfg(unix)]
pub fn send_signal(pid: u32, signal: &str) -> Result<()> {
    let status = std::process::Command::new("kill")
        .arg(format!("-{signal}"))
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .context("running `kill`")?;

    if !status.success() {
        return Err(anyhow!("`kill -{signal} {pid}` exited with {status}").into());
    }
    Ok(())
}

/// Map an exit status to a single integer code.
///
/// Processes ended by a signal report `128 + signal`, as shells do.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    UNKNOWN_EXIT_CODE
}
