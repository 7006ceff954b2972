// src/dag/propagation.rs

//! Readiness propagation after a job reaches a terminal state.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use crate::dag::completion_step::CompletionStep;
use crate::dag::job::JobNode;
use crate::types::{JobId, JobState};

/// Walks the dependents index downstream of a freshly terminal job.
///
/// Only `Pending` dependents are touched: they either lose one unmet
/// dependency (and may become `Ready`) or are `Skipped`, in which case their
/// own dependents are visited in the same pass.
pub struct Propagator<'a> {
    nodes: &'a mut HashMap<JobId, JobNode>,
    ready: &'a mut VecDeque<JobId>,
}

impl<'a> Propagator<'a> {
    pub fn new(nodes: &'a mut HashMap<JobId, JobNode>, ready: &'a mut VecDeque<JobId>) -> Self {
        Self { nodes, ready }
    }

    /// Breadth-first propagation starting at `root`, which must already be
    /// in a terminal state.
    pub fn settle(self, root: &str) -> CompletionStep {
        let mut step = CompletionStep::default();
        let mut queue: VecDeque<JobId> = VecDeque::from([root.to_string()]);

        while let Some(id) = queue.pop_front() {
            let (succeeded, dependents) = match self.nodes.get(&id) {
                Some(node) => (node.state == JobState::Succeeded, node.dependents.clone()),
                None => {
                    warn!(job = %id, "propagation reached a job missing from the graph");
                    continue;
                }
            };

            for dependent_id in dependents {
                let Some(dependent) = self.nodes.get_mut(&dependent_id) else {
                    warn!(job = %dependent_id, "dependent missing from the graph");
                    continue;
                };

                if dependent.state != JobState::Pending {
                    continue;
                }

                if succeeded {
                    dependent.unmet = dependent.unmet.saturating_sub(1);
                    if dependent.unmet == 0 {
                        dependent.state = JobState::Ready;
                        debug!(job = %dependent_id, "all dependencies succeeded; marking Ready");
                        self.ready.push_back(dependent_id.clone());
                        step.newly_ready.push(dependent_id);
                    }
                } else {
                    dependent.state = JobState::Skipped;
                    debug!(
                        job = %dependent_id,
                        upstream = %id,
                        "upstream job did not succeed; marking Skipped"
                    );
                    step.newly_skipped.push(dependent_id.clone());
                    queue.push_back(dependent_id);
                }
            }
        }

        step
    }
}
