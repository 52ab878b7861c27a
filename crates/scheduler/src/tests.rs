//! Tests for the scheduler crate.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use takt_graph::{NodeKind, NodeRef, ScheduledJob, RUN_ONCE_CRON};
use tokio::sync::watch;

use crate::cron::{due_within, normalize_cron, parse_cron, until_next_tick};
use crate::{JobSink, Scheduler, SchedulerError, Trigger};

fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

fn make_job(name: &str, cron: &str) -> ScheduledJob {
    ScheduledJob {
        qualified_name: name.to_string(),
        cron: cron.to_string(),
        entry_point: format!("m:{}", name),
        child_tasks: vec![NodeRef {
            name: "t1".to_string(),
            kind: NodeKind::Task,
            entry_point: "m:t1".to_string(),
        }],
    }
}

// -- normalize_cron ----------------------------------------------------

#[test]
fn normalize_cron_5_to_6_fields() {
    assert_eq!(normalize_cron("*/15 * * * *"), "0 */15 * * * *");
    assert_eq!(normalize_cron("0 6 * * 1-5"), "0 0 6 * * 1-5");
}

#[test]
fn normalize_cron_already_6_fields() {
    assert_eq!(normalize_cron("0 */15 * * * *"), "0 */15 * * * *");
}

#[test]
fn normalize_cron_trims_whitespace() {
    assert_eq!(normalize_cron("  */5 * * * *  "), "0 */5 * * * *");
}

// -- due_within --------------------------------------------------------

#[test]
fn due_within_fires_on_exact_boundary_tick() {
    let schedule = parse_cron("*/5 * * * *").unwrap();
    let period = chrono::Duration::seconds(60);
    assert!(due_within(&schedule, at("2026-01-15T10:05:00Z"), period));
}

#[test]
fn due_within_tolerates_wakeup_jitter() {
    let schedule = parse_cron("*/5 * * * *").unwrap();
    let period = chrono::Duration::seconds(60);
    assert!(due_within(&schedule, at("2026-01-15T10:05:00.250Z"), period));
}

#[test]
fn due_within_quiet_between_fire_times() {
    let schedule = parse_cron("*/5 * * * *").unwrap();
    let period = chrono::Duration::seconds(60);
    assert!(!due_within(&schedule, at("2026-01-15T10:06:00Z"), period));
    assert!(!due_within(&schedule, at("2026-01-15T10:04:00Z"), period));
}

// -- until_next_tick ---------------------------------------------------

#[test]
fn until_next_tick_mid_minute() {
    let pause = until_next_tick(at("2026-01-15T10:04:30Z"), Duration::from_secs(60));
    assert_eq!(pause, Duration::from_secs(30));
}

#[test]
fn until_next_tick_on_boundary_waits_full_period() {
    let pause = until_next_tick(at("2026-01-15T10:05:00Z"), Duration::from_secs(60));
    assert_eq!(pause, Duration::from_secs(60));
}

#[test]
fn until_next_tick_sub_second() {
    let pause = until_next_tick(at("2026-01-15T10:04:59.750Z"), Duration::from_secs(60));
    assert_eq!(pause, Duration::from_millis(250));
}

// -- schedule build ----------------------------------------------------

#[test]
fn invalid_cron_fails_at_build_time() {
    let err = Scheduler::new(vec![make_job("bad", "not a cron expr")]).unwrap_err();
    match err {
        SchedulerError::InvalidCron { flow, expr, .. } => {
            assert_eq!(flow, "bad");
            assert_eq!(expr, "not a cron expr");
        }
    }
}

#[test]
fn sentinel_is_run_once_not_a_schedule() {
    let scheduler = Scheduler::new(vec![make_job("once", RUN_ONCE_CRON)]).unwrap();
    assert!(scheduler.entries()[0].is_run_once());
}

#[test]
fn every_minute_step_form_is_a_real_cron() {
    // "*/1 * * * *" is NOT the sentinel; the literal comparison is load-bearing.
    let scheduler = Scheduler::new(vec![make_job("everymin", "*/1 * * * *")]).unwrap();
    assert!(matches!(
        scheduler.entries()[0].trigger,
        Trigger::Cron(_)
    ));
}

// -- due_jobs ----------------------------------------------------------

#[test]
fn run_once_job_fires_exactly_once_across_ticks() {
    let mut scheduler = Scheduler::new(vec![make_job("flowA", RUN_ONCE_CRON)]).unwrap();

    let base = at("2026-01-15T10:00:00Z");
    let first = scheduler.due_jobs(base);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].qualified_name, "flowA");
    assert_eq!(first[0].child_tasks.len(), 1);

    for minute in 1..=30 {
        let due = scheduler.due_jobs(base + chrono::Duration::minutes(minute));
        assert!(due.is_empty(), "run-once job re-fired at minute {minute}");
    }
    assert!(scheduler.run_state().has_fired("flowA"));
}

#[test]
fn cron_job_fires_only_on_matching_minutes_over_hours() {
    let mut scheduler = Scheduler::new(vec![make_job("fives", "*/5 * * * *")]).unwrap();

    let base = at("2026-01-15T00:00:00Z");
    for minute in 0..180 {
        let now = base + chrono::Duration::minutes(minute);
        let due = scheduler.due_jobs(now);
        if minute % 5 == 0 {
            assert_eq!(due.len(), 1, "expected fire at minute {minute}");
        } else {
            assert!(due.is_empty(), "unexpected fire at minute {minute}");
        }
    }
}

#[test]
fn mixed_schedule_batches_independently() {
    let mut scheduler = Scheduler::new(vec![
        make_job("once", RUN_ONCE_CRON),
        make_job("fives", "*/5 * * * *"),
    ])
    .unwrap();

    // Minute 5: both due, run-once for the first and last time.
    let due = scheduler.due_jobs(at("2026-01-15T10:05:00Z"));
    let names: Vec<&str> = due.iter().map(|j| j.qualified_name.as_str()).collect();
    assert_eq!(names, vec!["once", "fives"]);

    // Minute 6: nothing.
    assert!(scheduler.due_jobs(at("2026-01-15T10:06:00Z")).is_empty());

    // Minute 10: only the cron job.
    let due = scheduler.due_jobs(at("2026-01-15T10:10:00Z"));
    let names: Vec<&str> = due.iter().map(|j| j.qualified_name.as_str()).collect();
    assert_eq!(names, vec!["fives"]);
}

// -- run loop ----------------------------------------------------------

#[derive(Clone, Default)]
struct CollectingSink {
    submitted: Arc<Mutex<Vec<String>>>,
}

impl JobSink for CollectingSink {
    fn submit(&self, job: ScheduledJob) {
        self.submitted.lock().unwrap().push(job.qualified_name);
    }
}

#[tokio::test]
async fn loop_submits_run_once_job_and_stops_on_shutdown() {
    let scheduler =
        Scheduler::with_tick(vec![make_job("flowA", RUN_ONCE_CRON)], Duration::from_millis(100))
            .unwrap();

    let sink = CollectingSink::default();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(scheduler.run(sink.clone(), shutdown_rx));

    // A few ticks pass; the run-once job must be submitted exactly once.
    tokio::time::sleep(Duration::from_millis(550)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    let submitted = sink.submitted.lock().unwrap();
    assert_eq!(*submitted, vec!["flowA".to_string()]);
}

#[tokio::test]
async fn loop_exits_when_shutdown_sender_dropped() {
    let scheduler = Scheduler::with_tick(vec![], Duration::from_millis(100)).unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    drop(shutdown_tx);

    // Must return promptly rather than ticking forever.
    tokio::time::timeout(
        Duration::from_secs(1),
        scheduler.run(CollectingSink::default(), shutdown_rx),
    )
    .await
    .expect("loop did not exit after shutdown sender dropped");
}
