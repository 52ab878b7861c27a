//! Cron normalization, parsing, and due-window helpers.

use std::str::FromStr;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use cron::Schedule;

/// Normalize a 5-field cron expression to 6-field by prepending "0 " for seconds.
///
/// The `cron` crate requires 6 fields: `sec min hour day-of-month month day-of-week`.
/// Graph files use standard 5-field cron: `min hour day-of-month month day-of-week`.
pub(crate) fn normalize_cron(cron_5field: &str) -> String {
    let trimmed = cron_5field.trim();
    let field_count = trimmed.split_whitespace().count();
    if field_count == 5 {
        format!("0 {}", trimmed)
    } else {
        // Already 6-field or non-standard; pass through as-is.
        trimmed.to_string()
    }
}

/// Parse a cron expression, auto-prepending "0 " for 5-field expressions.
pub(crate) fn parse_cron(expr: &str) -> Result<Schedule, cron::error::Error> {
    Schedule::from_str(&normalize_cron(expr))
}

/// Check if a schedule came due during the tick window `(now - period, now]`.
///
/// The tick loop wakes on period boundaries and asks whether a scheduled
/// instant was reached since the previous wake-up. Evaluating the window
/// backward fires each matched instant exactly once, independent of
/// sub-second wake-up jitter.
pub(crate) fn due_within(schedule: &Schedule, now: DateTime<Utc>, period: Duration) -> bool {
    let window_start = now - period;
    match schedule.after(&window_start).next() {
        Some(next) => next <= now,
        None => false,
    }
}

/// Time remaining until the next tick boundary aligned to the wall clock.
///
/// Boundaries are multiples of `tick` since the Unix epoch, so a 60s tick
/// wakes at :00 of every minute. When `now` sits exactly on a boundary the
/// full period is returned, never a zero sleep.
pub(crate) fn until_next_tick(now: DateTime<Utc>, tick: StdDuration) -> StdDuration {
    let tick_ms = tick.as_millis().max(1) as i64;
    let now_ms = now.timestamp_millis();
    let rem = now_ms.rem_euclid(tick_ms);
    StdDuration::from_millis((tick_ms - rem) as u64)
}
