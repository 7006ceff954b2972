// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{JobsFile, load_and_validate, parse_duration};
use crate::engine::{RunReport, Scheduler, SchedulerOptions};
use crate::exec::ShellBackend;

pub use crate::dag::DependencyGraph;
pub use crate::engine::SchedulerHandle;
pub use crate::errors::JobdagError;
pub use crate::types::{JobId, JobState};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - jobs file loading
/// - scheduler options (cores, CLI overrides)
/// - the shell process backend
/// - Ctrl-C handling
///
/// Returns `None` for `--dry-run`.
pub async fn run(args: CliArgs) -> Result<Option<RunReport>> {
    let jobs = load_and_validate(&args.jobs)
        .with_context(|| format!("loading jobs file '{}'", args.jobs))?;

    if args.dry_run {
        print_dry_run(&jobs);
        return Ok(None);
    }

    let options = options_from(&jobs, &args)?;
    let backend = ShellBackend::new(jobs.scheduler.shell.clone());
    let (scheduler, handle) = Scheduler::new(options, backend);

    // Ctrl-C → orderly shutdown.
    {
        let handle = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            warn!("interrupted; stopping scheduler");
            handle.stop();
        });
    }

    for (id, job) in jobs.submission_order() {
        handle.submit(id.clone(), job.cmd.clone(), job.after.clone())?;
    }
    info!(jobs = jobs.job.len(), "all jobs submitted");

    let report = scheduler.run().await?;
    Ok(Some(report))
}

/// Jobs file settings, then CLI overrides. The run ends once the graph is
/// finished.
fn options_from(jobs: &JobsFile, args: &CliArgs) -> Result<SchedulerOptions> {
    let mut options = jobs.scheduler.to_options()?;

    if let Some(max) = args.max_concurrency {
        options = options.max_concurrency(max)?;
    }
    if let Some(ref timeout) = args.shutdown_timeout {
        let timeout =
            parse_duration(timeout).map_err(|e| anyhow!("--shutdown-timeout: {e}"))?;
        options = options.shutdown_timeout(timeout);
    }
    if args.test_mode {
        options = options.test_mode(true);
    }

    debug!(?options, "effective scheduler options");
    Ok(options.exit_when_idle(true))
}

/// Print jobs in submission order without running anything.
fn print_dry_run(jobs: &JobsFile) {
    let s = &jobs.scheduler;
    println!("jobdag dry-run");
    match s.max_concurrency {
        Some(max) => println!("  scheduler.max_concurrency = {max}"),
        None => println!("  scheduler.max_concurrency = <cores / 2>"),
    }
    println!("  scheduler.shutdown_timeout = {}", s.shutdown_timeout);
    println!("  scheduler.shell = {}", s.shell);
    if s.test_mode {
        println!("  scheduler.test_mode = true");
    }
    println!();

    println!("jobs ({}):", jobs.job.len());
    for (id, job) in jobs.submission_order() {
        println!("  - {id}");
        match job.cmd {
            Some(ref cmd) => println!("      cmd: {cmd}"),
            None => println!("      cmd: <none>"),
        }
        if !job.after.is_empty() {
            println!("      after: {:?}", job.after);
        }
    }

    debug!("dry-run complete (no execution)");
}
