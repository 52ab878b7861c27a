//! Timed execution of a single entry point.

use std::time::{Duration, Instant};

use crate::error::ExecError;
use crate::registry::HandlerRegistry;

/// Resolve `entry_point` and invoke its handler, returning the wall-clock
/// time the invocation took.
///
/// Timing brackets the invocation only; resolution cost is excluded. A
/// handler error is wrapped in [`ExecError::Execution`], never swallowed.
pub async fn execute(registry: &HandlerRegistry, entry_point: &str) -> Result<Duration, ExecError> {
    let handler = registry.resolve(entry_point)?;

    let started = Instant::now();
    let result = handler().await;
    let elapsed = started.elapsed();

    match result {
        Ok(()) => Ok(elapsed),
        Err(e) => Err(ExecError::Execution(e)),
    }
}

/// [`execute`], bounded by an optional per-job time limit.
///
/// On expiry the handler's future is dropped and [`ExecError::Timeout`]
/// returned, so a hung handler cannot pin a worker slot forever.
pub async fn execute_with_timeout(
    registry: &HandlerRegistry,
    entry_point: &str,
    limit: Option<Duration>,
) -> Result<Duration, ExecError> {
    match limit {
        Some(limit) => match tokio::time::timeout(limit, execute(registry, entry_point)).await {
            Ok(result) => result,
            Err(_) => Err(ExecError::Timeout(limit)),
        },
        None => execute(registry, entry_point).await,
    }
}
