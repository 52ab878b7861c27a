//! Per-job schedule entry type.

use cron::Schedule;
use takt_graph::ScheduledJob;

/// How a job is triggered.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Fire once per scheduler lifetime (the sentinel cron value).
    Once,
    /// Fire whenever the parsed cron schedule comes due.
    Cron(Schedule),
}

/// Scheduling state for a single flattened job: the job itself plus its
/// trigger, parsed once at schedule build time.
#[derive(Debug, Clone)]
pub struct JobEntry {
    pub job: ScheduledJob,
    pub trigger: Trigger,
}

impl JobEntry {
    /// Whether this entry uses the run-once trigger.
    pub fn is_run_once(&self) -> bool {
        matches!(self.trigger, Trigger::Once)
    }
}
