// src/dag/graph.rs

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, info};

use crate::dag::completion_step::CompletionStep;
use crate::dag::job::{JobCounts, JobNode, ReadyJob};
use crate::dag::propagation::Propagator;
use crate::errors::{JobdagError, Result};
use crate::types::{JobId, JobState};

/// In-memory DAG of jobs keyed by id, plus the per-job state machine.
///
/// The graph grows incrementally through [`append`](Self::append). Every
/// dependency must already be present when a job is appended, so a new node
/// can never close a cycle except through itself.
///
/// Readiness is tracked incrementally: each node keeps a count of unmet
/// dependencies and an index of its direct dependents, so a completion only
/// touches the affected downstream subgraph.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: HashMap<JobId, JobNode>,
    /// Jobs in `Ready`, in the order they became ready.
    ready: VecDeque<JobId>,
    /// Number of jobs in a terminal state.
    terminal: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new job.
    ///
    /// The job starts as:
    /// - `Skipped` if any dependency already failed or was skipped,
    /// - `Ready` if every dependency already succeeded (or there are none),
    /// - `Pending` otherwise.
    pub fn append(
        &mut self,
        id: &str,
        dependencies: &[JobId],
        command: Option<&str>,
    ) -> Result<()> {
        if self.nodes.contains_key(id) {
            return Err(JobdagError::DuplicateJob(id.to_string()));
        }

        let mut seen = HashSet::new();
        let mut deps: Vec<JobId> = Vec::with_capacity(dependencies.len());
        for dep in dependencies {
            if dep == id {
                return Err(JobdagError::SelfDependency(id.to_string()));
            }
            if !self.nodes.contains_key(dep) {
                return Err(JobdagError::UnknownDependency {
                    job: id.to_string(),
                    dependency: dep.clone(),
                });
            }
            if seen.insert(dep.as_str()) {
                deps.push(dep.clone());
            }
        }

        let mut node = JobNode::new(id.to_string(), deps, command.map(str::to_string));

        let mut poisoned = false;
        for dep in &node.dependencies {
            if let Some(dep_node) = self.nodes.get_mut(dep) {
                dep_node.dependents.push(node.id.clone());
                match dep_node.state {
                    JobState::Succeeded => {}
                    state if state.is_unsuccessful() => poisoned = true,
                    _ => node.unmet += 1,
                }
            }
        }

        node.state = if poisoned {
            self.terminal += 1;
            JobState::Skipped
        } else if node.unmet == 0 {
            self.ready.push_back(node.id.clone());
            JobState::Ready
        } else {
            JobState::Pending
        };

        debug!(
            job = %node.id,
            deps = ?node.dependencies,
            state = %node.state,
            sync_point = node.command.is_none(),
            "job appended"
        );
        if poisoned {
            info!(job = %node.id, "dependency already failed or skipped; job skipped on arrival");
        }

        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Hand out at most one job leaving the `Ready` state.
    ///
    /// A job with a command moves to `Running`. A job without a command
    /// moves straight to `Succeeded` (exit code 0) and its dependents are
    /// updated before this returns.
    pub fn next_ready(&mut self) -> Option<ReadyJob> {
        while let Some(id) = self.ready.pop_front() {
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            if node.state != JobState::Ready {
                continue;
            }

            match node.command.clone() {
                Some(command) => {
                    node.state = JobState::Running;
                    debug!(job = %id, "job dispatched; marking Running");
                    return Some(ReadyJob {
                        id,
                        command: Some(command),
                    });
                }
                None => {
                    node.state = JobState::Succeeded;
                    node.exit_code = Some(0);
                    self.terminal += 1;
                    debug!(job = %id, "synchronization point reached; marking Succeeded");

                    let step = Propagator::new(&mut self.nodes, &mut self.ready).settle(&id);
                    self.terminal += step.newly_skipped.len();
                    return Some(ReadyJob { id, command: None });
                }
            }
        }

        None
    }

    /// Record the exit code of a `Running` job and propagate to dependents.
    ///
    /// Completing a synchronization point that `next_ready` already marked
    /// `Succeeded` with exit code 0 is accepted and changes nothing.
    pub fn complete(&mut self, id: &str, exit_code: i32) -> Result<CompletionStep> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| JobdagError::UnknownJob(id.to_string()))?;

        match node.state {
            JobState::Running => {}
            JobState::Succeeded if node.command.is_none() && exit_code == 0 => {
                debug!(job = %id, "completion of synchronization point already recorded");
                return Ok(CompletionStep::default());
            }
            state => {
                return Err(JobdagError::InvalidTransition {
                    job: id.to_string(),
                    state,
                });
            }
        }

        node.state = if exit_code == 0 {
            JobState::Succeeded
        } else {
            JobState::Failed
        };
        node.exit_code = Some(exit_code);
        self.terminal += 1;

        debug!(job = %id, exit_code, state = %node.state, "job completed");

        let step = Propagator::new(&mut self.nodes, &mut self.ready).settle(id);
        self.terminal += step.newly_skipped.len();
        Ok(step)
    }

    /// `true` once every job is `Succeeded`, `Failed` or `Skipped`.
    pub fn is_finished(&self) -> bool {
        self.terminal == self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn state_of(&self, id: &str) -> Option<JobState> {
        self.nodes.get(id).map(|n| n.state)
    }

    pub fn exit_code_of(&self, id: &str) -> Option<i32> {
        self.nodes.get(id).and_then(|n| n.exit_code)
    }

    /// Immediate dependencies of a job.
    pub fn dependencies_of(&self, id: &str) -> &[JobId] {
        self.nodes
            .get(id)
            .map(|n| n.dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a job.
    pub fn dependents_of(&self, id: &str) -> &[JobId] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Number of jobs currently waiting in `Ready`.
    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    /// Number of jobs dispatched and not yet completed.
    pub fn running_len(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| n.state == JobState::Running)
            .count()
    }

    pub fn jobs(&self) -> impl Iterator<Item = &JobNode> {
        self.nodes.values()
    }

    pub fn counts(&self) -> JobCounts {
        let mut counts = JobCounts::default();
        for node in self.nodes.values() {
            counts.record(node.state);
        }
        counts
    }
}
