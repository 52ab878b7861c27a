//! Job execution: handler registry, timed invocation, and the worker pool.
//!
//! Flows and tasks are ordinary Rust functions registered against a
//! [`HandlerRegistry`] at startup; the graph's `"module:function"` entry
//! points resolve against that registry instead of being loaded from the
//! filesystem at execution time. The [`WorkerPool`] runs submitted jobs
//! concurrently, measures each invocation, hands successful outcomes to
//! the record store, and keeps every failure — error, timeout, or panic —
//! contained at the job boundary.

mod error;
mod execute;
mod pool;
mod registry;

pub use error::ExecError;
pub use execute::{execute, execute_with_timeout};
pub use pool::{JobRequest, WorkerPool, WorkerPoolConfig};
pub use registry::{HandlerError, HandlerRegistry, JobHandler};
