//! Worker pool: bounded concurrent execution of submitted jobs.

use std::sync::Arc;
use std::time::Duration;

use takt_graph::{NodeRef, ScheduledJob};
use takt_scheduler::JobSink;
use takt_store::RecorderHandle;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

use crate::error::ExecError;
use crate::execute::execute_with_timeout;
use crate::registry::HandlerRegistry;

/// One job-execution request as seen by the pool.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub qualified_name: String,
    pub entry_point: String,
    pub child_tasks: Vec<NodeRef>,
}

impl From<ScheduledJob> for JobRequest {
    fn from(job: ScheduledJob) -> Self {
        Self {
            qualified_name: job.qualified_name,
            entry_point: job.entry_point,
            child_tasks: job.child_tasks,
        }
    }
}

/// Pool sizing and per-job limits.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Concurrent job slots.
    pub workers: usize,
    /// Optional wall-clock limit per job.
    pub job_timeout: Option<Duration>,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            job_timeout: None,
        }
    }
}

/// Accepts job submissions and runs them concurrently, independent of the
/// scheduler loop's thread of control.
///
/// Submission is fire-and-forget: jobs queue on an unbounded channel, a
/// dispatcher takes a semaphore slot per job and spawns the execution.
/// Outcomes never reach the submitter — successes are recorded through
/// the recorder handle, failures (handler errors, timeouts, panics) are
/// logged at this boundary and go no further. Dropping the pool closes
/// the channel; in-flight jobs finish on their own.
pub struct WorkerPool {
    tx: mpsc::UnboundedSender<JobRequest>,
}

impl WorkerPool {
    /// Start the dispatcher with `registry` for resolution and `recorder`
    /// for successful-outcome persistence.
    pub fn start(
        config: WorkerPoolConfig,
        registry: Arc<HandlerRegistry>,
        recorder: RecorderHandle,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<JobRequest>();
        let slots = Arc::new(Semaphore::new(config.workers.max(1)));
        let job_timeout = config.job_timeout;

        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let permit = match Arc::clone(&slots).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };
                let registry = Arc::clone(&registry);
                let recorder = recorder.clone();
                tokio::spawn(async move {
                    run_job(registry, recorder, request, job_timeout).await;
                    drop(permit);
                });
            }
            debug!("worker pool dispatcher stopped");
        });

        Self { tx }
    }

    /// Queue a job for execution. Never blocks, never fails the caller.
    pub fn submit(&self, job: ScheduledJob) {
        if self.tx.send(job.into()).is_err() {
            warn!("worker pool dispatcher is gone; job dropped");
        }
    }
}

impl JobSink for WorkerPool {
    fn submit(&self, job: ScheduledJob) {
        WorkerPool::submit(self, job);
    }
}

/// Execute one job and handle its outcome. Nothing escapes this function:
/// the handler runs on its own task so even a panic is contained here.
async fn run_job(
    registry: Arc<HandlerRegistry>,
    recorder: RecorderHandle,
    request: JobRequest,
    job_timeout: Option<Duration>,
) {
    info!(flow = %request.qualified_name, entry_point = %request.entry_point, "executing job");

    let entry_point = request.entry_point.clone();
    let handle =
        tokio::spawn(async move { execute_with_timeout(&registry, &entry_point, job_timeout).await });

    let outcome = match handle.await {
        Ok(outcome) => outcome,
        Err(join_err) if join_err.is_panic() => {
            Err(ExecError::Execution("job handler panicked".into()))
        }
        // Cancelled at runtime shutdown; nothing to report.
        Err(_) => return,
    };

    match outcome {
        Ok(elapsed) => {
            info!(
                flow = %request.qualified_name,
                secs = elapsed.as_secs_f64(),
                "job finished"
            );
            let task_names: Vec<String> = request
                .child_tasks
                .iter()
                .map(|task| task.entry_point.clone())
                .collect();
            if let Err(e) = recorder
                .record(request.qualified_name.clone(), task_names, elapsed)
                .await
            {
                error!(flow = %request.qualified_name, error = %e, "failed to queue execution records");
            }
        }
        Err(e) => {
            error!(flow = %request.qualified_name, error = %e, "job failed");
        }
    }
}
