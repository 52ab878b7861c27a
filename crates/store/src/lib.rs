//! Durable execution-record storage.
//!
//! Every fired job writes one row per declared child task into the
//! append-only `job_executions` table (SQLite via sqlx). Workers never
//! talk to the database directly: they send record requests to a
//! [`Recorder`] actor through a clonable [`RecorderHandle`], so there is
//! exactly one writer regardless of how many jobs finish at once. The
//! writer itself retries lock contention with bounded backoff before
//! giving up on a batch.

mod error;
mod recorder;
mod sqlite;
mod types;

pub use error::StoreError;
pub use recorder::{RecordRequest, Recorder, RecorderHandle};
pub use sqlite::ExecutionStore;
pub use types::ExecutionRecord;
