//! Tick-driven cron scheduling for flattened flow jobs.
//!
//! The [`Scheduler`] owns the flattened job list and the run-once state
//! for its process lifetime. Once per clock-aligned tick it evaluates
//! every job — run-once jobs fire iff they have not fired before, cron
//! jobs fire iff a scheduled instant landed in the tick window that just
//! elapsed — and submits the due batch to a [`JobSink`] without waiting
//! for completion.
//!
//! Cron expressions are parsed once at schedule build time; an invalid
//! expression aborts startup instead of surfacing repeatedly inside the
//! loop.

mod core;
pub(crate) mod cron;
mod entry;
mod error;
mod run_state;

#[cfg(test)]
mod tests;

pub use self::core::{JobSink, Scheduler, DEFAULT_TICK};
pub use self::entry::{JobEntry, Trigger};
pub use self::error::SchedulerError;
pub use self::run_state::RunState;
