//! SQLite-backed execution-record store.

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::ExecutionRecord;

/// Retries for a contended write before the error is surfaced.
const MAX_RETRIES: u32 = 3;
/// First backoff step; doubles per attempt.
const BACKOFF_BASE: Duration = Duration::from_millis(50);

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS job_executions (
    id TEXT PRIMARY KEY,
    flow_name TEXT NOT NULL,
    task_name TEXT NOT NULL,
    execution_time REAL NOT NULL,
    timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Append-only store for [`ExecutionRecord`]s.
///
/// Holds a single-connection pool: all writes are funneled through the
/// [`crate::Recorder`] actor anyway, and a lone connection keeps SQLite's
/// locking out of the picture for in-process readers too.
#[derive(Clone)]
pub struct ExecutionStore {
    pool: SqlitePool,
}

impl ExecutionStore {
    /// Open (and create if missing) the database at `url`.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `job_executions` table if it does not exist.
    ///
    /// Called once at startup rather than before every write.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Write one record per child task, all sharing `execution_time`.
    ///
    /// Each row gets a fresh UUID and the insertion timestamp. The batch
    /// is one transaction; lock contention is retried with doubling
    /// backoff before the error is returned. Returns the number of rows
    /// written.
    pub async fn record(
        &self,
        flow_name: &str,
        task_names: &[String],
        execution_time: f64,
    ) -> Result<usize, StoreError> {
        if task_names.is_empty() {
            return Ok(0);
        }

        let mut attempt = 0;
        loop {
            match self.insert_batch(flow_name, task_names, execution_time).await {
                Ok(written) => return Ok(written),
                Err(e) if is_locked(&e) && attempt < MAX_RETRIES => {
                    attempt += 1;
                    let backoff = BACKOFF_BASE * 2u32.pow(attempt - 1);
                    warn!(
                        flow = %flow_name,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "record store contended; retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn insert_batch(
        &self,
        flow_name: &str,
        task_names: &[String],
        execution_time: f64,
    ) -> Result<usize, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        for task_name in task_names {
            sqlx::query(
                r#"
                INSERT INTO job_executions (id, flow_name, task_name, execution_time, timestamp)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(flow_name)
            .bind(task_name)
            .bind(execution_time)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(task_names.len())
    }

    /// Most recent records, newest first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<ExecutionRecord>, StoreError> {
        let records = sqlx::query_as(
            r#"
            SELECT id, flow_name, task_name, execution_time, timestamp
            FROM job_executions
            ORDER BY timestamp DESC, id
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Total number of stored records.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM job_executions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// SQLite signals write contention as "database is locked" / "busy".
fn is_locked(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => {
            let msg = db.message();
            msg.contains("locked") || msg.contains("busy")
        }
        _ => false,
    }
}
