// src/dag/mod.rs

//! Dependency graph and per-job state machine.
//!
//! - [`graph`] holds the DAG and its `append` / `next_ready` / `complete`
//!   operations.
//! - [`job`] defines graph nodes and the jobs handed out to the scheduler.
//! - [`propagation`] releases or skips dependents after a completion.
//! - [`completion_step`] describes what a single completion changed.

pub mod completion_step;
pub mod graph;
pub mod job;
pub mod propagation;

pub use completion_step::CompletionStep;
pub use graph::DependencyGraph;
pub use job::{JobCounts, JobNode, ReadyJob};
