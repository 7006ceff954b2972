// src/engine/shutdown.rs

//! Two-stage shutdown escalation as a plain elapsed-time state machine.

use std::time::Duration;

/// What the shutdown drain should do to processes still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Escalation {
    /// Keep reaping; running jobs may still finish naturally.
    Drain,
    /// `elapsed >= timeout`: ask remaining processes to terminate.
    Terminate,
    /// `elapsed >= 2 * timeout`: force-kill remaining processes.
    Kill,
}

impl Escalation {
    pub fn at(elapsed: Duration, timeout: Duration) -> Self {
        if elapsed >= timeout.saturating_mul(2) {
            Escalation::Kill
        } else if elapsed >= timeout {
            Escalation::Terminate
        } else {
            Escalation::Drain
        }
    }
}
