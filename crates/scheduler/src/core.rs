//! [`Scheduler`] — the tick-driven control loop over flattened jobs.

use std::time::Duration;

use chrono::{DateTime, Utc};
use takt_graph::{ScheduledJob, RUN_ONCE_CRON};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cron::{due_within, parse_cron, until_next_tick};
use crate::entry::{JobEntry, Trigger};
use crate::error::SchedulerError;
use crate::run_state::RunState;

/// Default tick period: one minute, matching 5-field cron resolution.
pub const DEFAULT_TICK: Duration = Duration::from_secs(60);

/// Sink the scheduler submits due jobs to, fire-and-forget.
///
/// Implemented by the worker pool; the loop never waits on job completion
/// and never observes job outcomes.
pub trait JobSink {
    fn submit(&self, job: ScheduledJob);
}

/// Owns the schedule and the run-once state for one process lifetime.
///
/// Construction parses every cron expression exactly once; the loop only
/// evaluates pre-parsed schedules. [`due_jobs`](Scheduler::due_jobs) is
/// the pure per-tick evaluation, driven by [`run`](Scheduler::run) with
/// wall-clock `now` or by tests with injected instants.
#[derive(Debug)]
pub struct Scheduler {
    entries: Vec<JobEntry>,
    run_state: RunState,
    tick: Duration,
}

impl Scheduler {
    /// Build a schedule with the default one-minute tick.
    pub fn new(jobs: Vec<ScheduledJob>) -> Result<Self, SchedulerError> {
        Self::with_tick(jobs, DEFAULT_TICK)
    }

    /// Build a schedule with an explicit tick period.
    ///
    /// Fails with [`SchedulerError::InvalidCron`] on the first job whose
    /// expression does not parse. The run-once sentinel is compared
    /// literally and never parsed.
    pub fn with_tick(jobs: Vec<ScheduledJob>, tick: Duration) -> Result<Self, SchedulerError> {
        let mut entries = Vec::with_capacity(jobs.len());
        for job in jobs {
            let trigger = if job.cron.trim() == RUN_ONCE_CRON {
                Trigger::Once
            } else {
                let schedule =
                    parse_cron(&job.cron).map_err(|source| SchedulerError::InvalidCron {
                        flow: job.qualified_name.clone(),
                        expr: job.cron.clone(),
                        source,
                    })?;
                Trigger::Cron(schedule)
            };
            entries.push(JobEntry { job, trigger });
        }
        Ok(Self {
            entries,
            run_state: RunState::new(),
            tick,
        })
    }

    /// Number of jobs in the schedule.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The schedule entries, in flattening order.
    pub fn entries(&self) -> &[JobEntry] {
        &self.entries
    }

    /// Run-once bookkeeping (loop-owned).
    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    /// Evaluate one tick at `now` and return the batch of due jobs.
    ///
    /// Run-once jobs are marked fired at decision time, so a job in the
    /// returned batch can never be returned again. Cron jobs carry no
    /// memory between ticks beyond the window check itself.
    pub fn due_jobs(&mut self, now: DateTime<Utc>) -> Vec<ScheduledJob> {
        let period = chrono::Duration::from_std(self.tick)
            .unwrap_or_else(|_| chrono::Duration::seconds(60));

        let mut due = Vec::new();
        for entry in &self.entries {
            match &entry.trigger {
                Trigger::Once => {
                    if !self.run_state.has_fired(&entry.job.qualified_name) {
                        self.run_state.mark_fired(&entry.job.qualified_name);
                        due.push(entry.job.clone());
                    }
                }
                Trigger::Cron(schedule) => {
                    if due_within(schedule, now, period) {
                        due.push(entry.job.clone());
                    }
                }
            }
        }
        due
    }

    /// Run the tick loop until `shutdown` flips or its sender is dropped.
    ///
    /// Sleeps until the next clock-aligned tick boundary, evaluates the
    /// schedule, and submits the due batch to `sink` without awaiting any
    /// job. Dispatch is fire-and-forget; job execution is invisible to
    /// this loop.
    pub async fn run<S: JobSink>(mut self, sink: S, mut shutdown: watch::Receiver<bool>) {
        info!(
            jobs = self.entries.len(),
            tick_secs = self.tick.as_secs(),
            "scheduler loop started"
        );

        loop {
            let pause = until_next_tick(Utc::now(), self.tick);
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = shutdown.changed() => {
                    info!("scheduler loop shutting down");
                    break;
                }
            }

            let now = Utc::now();
            let due = self.due_jobs(now);
            if due.is_empty() {
                debug!(%now, "tick: no jobs due");
                continue;
            }

            info!(count = due.len(), %now, "tick: dispatching due jobs");
            for job in due {
                sink.submit(job);
            }
        }
    }
}
