//! Execution record row type.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One durable record of a (job, child task) execution.
///
/// `task_name` carries the child task's entry-point string, and
/// `execution_time` the wall-clock seconds measured for the job's single
/// entry-point invocation — every child task of one execution shares that
/// value.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ExecutionRecord {
    pub id: String,
    pub flow_name: String,
    pub task_name: String,
    pub execution_time: f64,
    pub timestamp: DateTime<Utc>,
}
