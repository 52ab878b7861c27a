use thiserror::Error;

/// Errors from the execution-record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database failure that survived the contention retries.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The recorder actor is gone; its channel is closed.
    #[error("recorder channel closed")]
    Closed,
}
