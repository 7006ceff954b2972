use std::error::Error;
use std::fs;
use std::time::Duration;

use jobdag::config::{load_and_validate, load_from_str, parse_duration, JobsFile};
use jobdag::errors::JobdagError;
use jobdag_test_utils::builders::{JobConfigBuilder, JobsFileBuilder};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

const PIPELINE: &str = r#"
[scheduler]
max_concurrency = 3
shutdown_timeout = "30s"

[job.report]
cmd = "multiqc ."
after = ["align", "qc"]

[job.align]
cmd = "bwa mem ref.fa reads.fq > out.sam"
after = ["qc"]

[job.qc]
cmd = "fastqc reads.fq"

[job.done]
after = ["report"]
"#;

fn order(jobs: &JobsFile) -> Vec<String> {
    jobs.submission_order().map(|(id, _)| id.clone()).collect()
}

fn position(order: &[String], id: &str) -> usize {
    order.iter().position(|j| j == id).expect("job in order")
}

#[test]
fn jobs_file_loads_from_disk_in_dependency_order() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("Jobs.toml");
    fs::write(&path, PIPELINE)?;

    let jobs = load_and_validate(&path)?;

    assert_eq!(jobs.scheduler.max_concurrency, Some(3));
    assert_eq!(jobs.scheduler.shutdown_timeout, "30s");
    assert_eq!(jobs.job.len(), 4);
    assert_eq!(jobs.job["done"].cmd, None);

    let order = order(&jobs);
    assert_eq!(order.len(), 4);
    assert!(position(&order, "qc") < position(&order, "align"));
    assert!(position(&order, "align") < position(&order, "report"));
    assert!(position(&order, "report") < position(&order, "done"));
    Ok(())
}

#[test]
fn scheduler_section_defaults_apply() -> TestResult {
    let raw = load_from_str("[job.only]\ncmd = \"true\"\n")?;
    let jobs = JobsFile::try_from(raw)?;

    assert_eq!(jobs.scheduler.max_concurrency, None);
    assert_eq!(jobs.scheduler.shutdown_timeout, "60s");
    assert_eq!(jobs.scheduler.poll_interval, "100ms");
    assert!(!jobs.scheduler.test_mode);
    Ok(())
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = load_and_validate(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, JobdagError::IoError(_)));
}

#[test]
fn malformed_toml_is_rejected() {
    let err = load_from_str("[job.a\ncmd = 1").unwrap_err();
    assert!(matches!(err, JobdagError::TomlError(_)));
}

#[test]
fn empty_jobs_file_is_rejected() {
    let err = JobsFile::try_from(JobsFileBuilder::new().raw()).unwrap_err();
    assert!(matches!(err, JobdagError::ConfigError(_)));
}

#[test]
fn unknown_after_reference_is_rejected() {
    let raw = JobsFileBuilder::new()
        .with_job("b", JobConfigBuilder::new("echo b").after("a").build())
        .raw();

    match JobsFile::try_from(raw) {
        Err(JobdagError::UnknownDependency { job, dependency }) => {
            assert_eq!(job, "b");
            assert_eq!(dependency, "a");
        }
        other => panic!("expected UnknownDependency, got {other:?}"),
    }
}

#[test]
fn self_reference_is_rejected() {
    let raw = JobsFileBuilder::new()
        .with_job("a", JobConfigBuilder::new("echo a").after("a").build())
        .raw();

    let err = JobsFile::try_from(raw).unwrap_err();
    assert!(matches!(err, JobdagError::SelfDependency(ref id) if id == "a"));
}

#[test]
fn cycle_between_jobs_is_rejected() {
    let raw = JobsFileBuilder::new()
        .with_job("a", JobConfigBuilder::new("echo a").after("c").build())
        .with_job("b", JobConfigBuilder::new("echo b").after("a").build())
        .with_job("c", JobConfigBuilder::new("echo c").after("b").build())
        .with_job("free", JobConfigBuilder::new("echo free").build())
        .raw();

    let err = JobsFile::try_from(raw).unwrap_err();
    assert!(matches!(err, JobdagError::DagCycle(_)), "got {err:?}");
    assert!(err.is_topology());
}

#[test]
fn zero_max_concurrency_is_rejected() {
    let raw = JobsFileBuilder::new()
        .max_concurrency(0)
        .with_job("a", JobConfigBuilder::new("true").build())
        .raw();

    assert!(matches!(JobsFile::try_from(raw), Err(JobdagError::ConfigError(_))));
}

#[test]
fn bad_shutdown_timeout_is_rejected() {
    let raw = JobsFileBuilder::new()
        .shutdown_timeout("soon")
        .with_job("a", JobConfigBuilder::new("true").build())
        .raw();

    match JobsFile::try_from(raw) {
        Err(JobdagError::ConfigError(msg)) => assert!(msg.contains("shutdown_timeout")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn zero_poll_interval_is_rejected() -> TestResult {
    let raw = load_from_str(
        r#"
[scheduler]
poll_interval = "0ms"

[job.a]
cmd = "true"
"#,
    )?;

    assert!(matches!(JobsFile::try_from(raw), Err(JobdagError::ConfigError(_))));
    Ok(())
}

#[test]
fn sync_point_job_is_accepted() -> TestResult {
    let jobs = JobsFileBuilder::new()
        .with_job("a", JobConfigBuilder::new("true").build())
        .with_job("gate", JobConfigBuilder::sync_point().after("a").build())
        .build();

    assert_eq!(jobs.job["gate"].cmd, None);
    assert_eq!(order(&jobs), vec!["a".to_string(), "gate".to_string()]);
    Ok(())
}

#[test]
fn durations_parse_with_units() {
    assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_duration("60s"), Ok(Duration::from_secs(60)));
    assert_eq!(parse_duration(" 2m "), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));

    assert!(parse_duration("").is_err());
    assert!(parse_duration("10").is_err());
    assert!(parse_duration("5d").is_err());
    assert!(parse_duration("s").is_err());
}

#[test]
fn oversized_durations_are_errors_not_panics() {
    let err = parse_duration("307445734561825862m").unwrap_err();
    assert!(err.contains("overflows"), "{err}");
    assert!(parse_duration("5124095576030432h").is_err());
    assert!(parse_duration("99999999999999999999s").is_err());

    // Largest minute count that still fits.
    let max_minutes = u64::MAX / 60;
    assert_eq!(
        parse_duration(&format!("{max_minutes}m")),
        Ok(Duration::from_secs(max_minutes * 60))
    );
}
