// src/dag/completion_step.rs

//! Result type for a single graph completion.

use crate::types::JobId;

/// What changed downstream of a completed job.
///
/// Useful for tests that drive the graph by hand and want to assert on
/// exactly which dependents were released or skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionStep {
    /// Dependents whose last unmet dependency just succeeded.
    pub newly_ready: Vec<JobId>,
    /// Dependents (transitively) skipped because of this completion.
    pub newly_skipped: Vec<JobId>,
}

impl CompletionStep {
    pub fn is_empty(&self) -> bool {
        self.newly_ready.is_empty() && self.newly_skipped.is_empty()
    }
}
