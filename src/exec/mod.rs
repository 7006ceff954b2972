// src/exec/mod.rs

//! Process execution layer.
//!
//! This module starts job commands as OS processes and exposes them to the
//! scheduler as non-blocking handles.
//!
//! - [`backend`] provides the `ProcessBackend` / `JobProcess` traits, which
//!   tests replace with a fake implementation.
//! - [`shell`] is the production backend built on `tokio::process`.

pub mod backend;
pub mod shell;

pub use backend::{JobProcess, ProcessBackend};
pub use shell::{DEFAULT_SHELL, ShellBackend, ShellProcess, UNKNOWN_EXIT_CODE};
#[cfg(unix)]
pub use shell::send_signal;
