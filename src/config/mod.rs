// src/config/mod.rs

//! Jobs file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a jobs file from disk (`loader.rs`).
//! - Validate the job graph and scheduler settings (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{load_and_validate, load_from_path, load_from_str};
pub use model::{JobConfig, JobsFile, RawJobsFile, SchedulerSection};
pub use validate::validate_raw_jobs;
