//! Recorder actor: the single serialized writer for execution records.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::error::StoreError;
use crate::sqlite::ExecutionStore;

/// Depth of the recorder inbox; sends backpressure workers past this.
const CHANNEL_CAPACITY: usize = 256;

/// One write request: a finished job plus its declared child tasks.
#[derive(Debug)]
pub struct RecordRequest {
    pub flow_name: String,
    pub task_names: Vec<String>,
    pub execution_time: f64,
}

/// Clonable sending side of the recorder channel.
///
/// Workers record through this handle; the actor behind it owns the only
/// database writer, so concurrent job completions never race on the
/// store.
#[derive(Clone)]
pub struct RecorderHandle {
    tx: mpsc::Sender<RecordRequest>,
}

impl RecorderHandle {
    /// Queue records for a finished job execution.
    pub async fn record(
        &self,
        flow_name: String,
        task_names: Vec<String>,
        elapsed: Duration,
    ) -> Result<(), StoreError> {
        let request = RecordRequest {
            flow_name,
            task_names,
            execution_time: elapsed.as_secs_f64(),
        };
        self.tx.send(request).await.map_err(|_| StoreError::Closed)
    }
}

/// The recorder actor itself.
pub struct Recorder;

impl Recorder {
    /// Spawn the recorder task over `store`.
    ///
    /// Returns the handle workers record through and the join handle of
    /// the actor task. The actor drains its inbox and exits once every
    /// handle clone has been dropped; awaiting the join handle at
    /// shutdown flushes any queued records.
    pub fn spawn(store: ExecutionStore) -> (RecorderHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<RecordRequest>(CHANNEL_CAPACITY);

        let task = tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                match store
                    .record(&request.flow_name, &request.task_names, request.execution_time)
                    .await
                {
                    Ok(written) => {
                        debug!(
                            flow = %request.flow_name,
                            records = written,
                            "execution records written"
                        );
                    }
                    Err(e) => {
                        error!(
                            flow = %request.flow_name,
                            error = %e,
                            "failed to write execution records"
                        );
                    }
                }
            }
            debug!("recorder drained and stopped");
        });

        (RecorderHandle { tx }, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_flow_through_the_actor() {
        let store = ExecutionStore::connect("sqlite::memory:").await.unwrap();
        store.ensure_schema().await.unwrap();

        let (handle, task) = Recorder::spawn(store.clone());

        handle
            .record(
                "flowA".to_string(),
                vec!["m:t1".to_string(), "m:t2".to_string()],
                Duration::from_millis(1500),
            )
            .await
            .unwrap();

        drop(handle);
        task.await.unwrap();

        let records = store.recent(10).await.unwrap();
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.flow_name, "flowA");
            assert!((record.execution_time - 1.5).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn record_after_actor_gone_reports_closed() {
        let store = ExecutionStore::connect("sqlite::memory:").await.unwrap();
        store.ensure_schema().await.unwrap();

        let (handle, task) = Recorder::spawn(store);
        task.abort();
        let _ = task.await;

        let result = handle
            .record("flowA".to_string(), vec!["m:t1".to_string()], Duration::ZERO)
            .await;
        assert!(matches!(result, Err(StoreError::Closed)));
    }
}
