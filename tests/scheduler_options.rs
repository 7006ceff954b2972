use std::io;
use std::num::NonZeroUsize;
use std::time::Duration;

use jobdag::engine::{Escalation, SchedulerOptions};
use jobdag::errors::JobdagError;

#[test]
fn fewer_than_two_cores_is_fatal() {
    for cores in [0, 1] {
        match SchedulerOptions::from_cores(cores) {
            Err(JobdagError::InsufficientCores(n)) => assert_eq!(n, cores),
            other => panic!("expected InsufficientCores, got {other:?}"),
        }
    }
}

#[test]
fn failed_core_query_surfaces_io_error() {
    let query = Err(io::Error::other("cgroup quota unreadable"));
    match SchedulerOptions::from_parallelism(query) {
        Err(JobdagError::IoError(err)) => assert!(err.to_string().contains("cgroup")),
        other => panic!("expected IoError, got {other:?}"),
    }

    let one = NonZeroUsize::new(1).unwrap();
    assert!(matches!(
        SchedulerOptions::from_parallelism(Ok(one)),
        Err(JobdagError::InsufficientCores(1))
    ));

    let eight = NonZeroUsize::new(8).unwrap();
    assert_eq!(SchedulerOptions::from_parallelism(Ok(eight)).unwrap().max_concurrency, 4);
}

#[test]
fn concurrency_is_half_the_cores() {
    let cap = |cores| SchedulerOptions::from_cores(cores).unwrap().max_concurrency;
    assert_eq!(cap(2), 1);
    assert_eq!(cap(3), 1);
    assert_eq!(cap(8), 4);
    assert_eq!(cap(17), 8);
}

#[test]
fn explicit_concurrency_must_be_positive() {
    assert!(matches!(
        SchedulerOptions::with_max_concurrency(0),
        Err(JobdagError::ConfigError(_))
    ));
    assert_eq!(SchedulerOptions::with_max_concurrency(6).unwrap().max_concurrency, 6);
}

#[test]
fn defaults_match_documented_values() {
    let opts = SchedulerOptions::from_cores(4).unwrap();
    assert_eq!(opts.shutdown_timeout, Duration::from_secs(60));
    assert_eq!(opts.poll_interval, Duration::from_millis(100));
    assert!(!opts.test_mode);
    assert!(!opts.exit_when_idle);
}

#[test]
fn escalation_follows_elapsed_time() {
    let timeout = Duration::from_secs(60);
    let at = |secs| Escalation::at(Duration::from_secs(secs), timeout);

    assert_eq!(at(0), Escalation::Drain);
    assert_eq!(at(59), Escalation::Drain);
    assert_eq!(at(60), Escalation::Terminate);
    assert_eq!(at(119), Escalation::Terminate);
    assert_eq!(at(120), Escalation::Kill);
    assert_eq!(at(10_000), Escalation::Kill);
}

#[test]
fn zero_timeout_kills_immediately() {
    assert_eq!(Escalation::at(Duration::ZERO, Duration::ZERO), Escalation::Kill);
}
