use std::error::Error;
use std::fs;

use clap::Parser;
use jobdag::JobState;
use jobdag::cli::CliArgs;
use jobdag_test_utils::init_tracing;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

fn args(extra: &[&str]) -> CliArgs {
    let mut argv = vec!["jobdag"];
    argv.extend_from_slice(extra);
    CliArgs::try_parse_from(argv).expect("valid arguments")
}

fn enough_cores() -> bool {
    std::thread::available_parallelism()
        .map(|n| n.get() >= 2)
        .unwrap_or(false)
}

#[test]
fn cli_defaults_and_overrides_parse() {
    let defaults = args(&[]);
    assert_eq!(defaults.jobs, "Jobs.toml");
    assert!(defaults.max_concurrency.is_none());
    assert!(!defaults.dry_run);
    assert!(!defaults.test_mode);

    let custom = args(&[
        "--jobs",
        "pipeline.toml",
        "--max-concurrency",
        "3",
        "--shutdown-timeout",
        "5s",
        "--test-mode",
        "--log-level",
        "debug",
    ]);
    assert_eq!(custom.jobs, "pipeline.toml");
    assert_eq!(custom.max_concurrency, Some(3));
    assert_eq!(custom.shutdown_timeout.as_deref(), Some("5s"));
    assert!(custom.test_mode);
}

#[tokio::test]
async fn dry_run_executes_nothing() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let marker = dir.path().join("ran");
    let path = dir.path().join("Jobs.toml");
    fs::write(
        &path,
        format!("[job.touch]\ncmd = \"touch '{}'\"\n", marker.display()),
    )?;

    let path = path.display().to_string();
    let report = jobdag::run(args(&["--jobs", &path, "--dry-run"])).await?;

    assert!(report.is_none());
    assert!(!marker.exists());
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn run_executes_jobs_file_to_completion() -> TestResult {
    init_tracing();
    if !enough_cores() {
        return Ok(());
    }

    let dir = tempdir()?;
    let out = dir.path().join("out.txt");
    let out = out.display();
    let path = dir.path().join("Jobs.toml");
    fs::write(
        &path,
        format!(
            r#"
[scheduler]
poll_interval = "10ms"

[job.first]
cmd = "echo first >> '{out}'"

[job.gate]
after = ["first"]

[job.second]
cmd = "echo second >> '{out}'"
after = ["gate"]

[job.broken]
cmd = "exit 5"

[job.never]
cmd = "echo never >> '{out}'"
after = ["broken"]
"#
        ),
    )?;

    let path = path.display().to_string();
    let report = jobdag::run(args(&["--jobs", &path, "--max-concurrency", "1"]))
        .await?
        .expect("report for a real run");

    assert_eq!(report.max_concurrency, 1);
    assert_eq!(report.state_of("second"), Some(JobState::Succeeded));
    assert_eq!(report.exit_code_of("broken"), Some(5));
    assert_eq!(report.state_of("never"), Some(JobState::Skipped));
    assert!(!report.all_succeeded());

    let written = fs::read_to_string(dir.path().join("out.txt"))?;
    assert_eq!(written, "first\nsecond\n");
    Ok(())
}

#[test]
fn log_filter_prefers_cli_then_env_then_info() {
    use jobdag::cli::LogLevel;
    use jobdag::logging::filter_directives;

    assert_eq!(filter_directives(Some(LogLevel::Debug), Some("warn")), "debug");
    assert_eq!(
        filter_directives(None, Some("info,jobdag::engine=debug")),
        "info,jobdag::engine=debug"
    );
    assert_eq!(filter_directives(None, Some("   ")), "info");
    assert_eq!(filter_directives(None, None), "info");
}

#[test]
fn env_directives_reach_the_filter() {
    use jobdag::logging::env_filter;

    let filter = env_filter(None, Some("jobdag::engine=debug")).expect("valid directives");
    assert!(filter.to_string().contains("jobdag::engine=debug"));

    let err = env_filter(None, Some("jobdag=loudest")).unwrap_err();
    assert!(err.to_string().contains("JOBDAG_LOG"), "{err}");

    // An explicit CLI level wins over malformed environment directives.
    assert!(env_filter(Some(jobdag::cli::LogLevel::Warn), Some("jobdag=loudest")).is_ok());
}
