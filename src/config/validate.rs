// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::duration::parse_duration;
use crate::config::model::{JobsFile, RawJobsFile, SchedulerSection};
use crate::errors::{JobdagError, Result};
use crate::types::JobId;

impl TryFrom<RawJobsFile> for JobsFile {
    type Error = crate::errors::JobdagError;

    fn try_from(raw: RawJobsFile) -> std::result::Result<Self, Self::Error> {
        let order = validate_raw_jobs(&raw)?;
        Ok(JobsFile::new_unchecked(raw.scheduler, raw.job, order))
    }
}

/// Validate a raw jobs file and return its submission order.
pub fn validate_raw_jobs(cfg: &RawJobsFile) -> Result<Vec<JobId>> {
    ensure_has_jobs(cfg)?;
    validate_scheduler_section(&cfg.scheduler)?;
    validate_job_dependencies(cfg)?;
    dependency_order(cfg)
}

fn ensure_has_jobs(cfg: &RawJobsFile) -> Result<()> {
    if cfg.job.is_empty() {
        return Err(JobdagError::ConfigError(
            "jobs file must contain at least one [job.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_scheduler_section(section: &SchedulerSection) -> Result<()> {
    if section.max_concurrency == Some(0) {
        return Err(JobdagError::ConfigError(
            "[scheduler].max_concurrency must be >= 1 (got 0)".to_string(),
        ));
    }

    parse_duration(&section.shutdown_timeout).map_err(|e| {
        JobdagError::ConfigError(format!("[scheduler].shutdown_timeout: {e}"))
    })?;

    let poll = parse_duration(&section.poll_interval)
        .map_err(|e| JobdagError::ConfigError(format!("[scheduler].poll_interval: {e}")))?;
    if poll.is_zero() {
        return Err(JobdagError::ConfigError(
            "[scheduler].poll_interval must be greater than zero".to_string(),
        ));
    }

    if section.shell.trim().is_empty() {
        return Err(JobdagError::ConfigError(
            "[scheduler].shell must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_job_dependencies(cfg: &RawJobsFile) -> Result<()> {
    for (id, job) in cfg.job.iter() {
        for dep in job.after.iter() {
            if dep == id {
                return Err(JobdagError::SelfDependency(id.clone()));
            }
            if !cfg.job.contains_key(dep) {
                return Err(JobdagError::UnknownDependency {
                    job: id.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Topologically order the jobs, failing on cycles.
///
/// Edge direction: dependency -> job. For
///
/// ```toml
/// [job.B]
/// after = ["A"]
/// ```
///
/// we add edge A -> B.
fn dependency_order(cfg: &RawJobsFile) -> Result<Vec<JobId>> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for id in cfg.job.keys() {
        graph.add_node(id.as_str());
    }

    for (id, job) in cfg.job.iter() {
        for dep in job.after.iter() {
            graph.add_edge(dep.as_str(), id.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
        Err(cycle) => Err(JobdagError::DagCycle(format!(
            "cycle involves job '{}'",
            cycle.node_id()
        ))),
    }
}
