use std::time::Duration;

use thiserror::Error;

/// Errors from resolving and executing a job entry point.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The entry point lacks the `module:function` separator.
    #[error("malformed entry point '{0}': expected 'module:function'")]
    MalformedEntryPoint(String),

    /// No module with this name is registered.
    #[error("module not registered: '{0}'")]
    ModuleNotFound(String),

    /// The module is registered but has no function with this name.
    #[error("function '{function}' not found in module '{module}'")]
    FunctionNotFound { module: String, function: String },

    /// The handler ran and failed (returned an error or panicked).
    #[error("job handler failed: {0}")]
    Execution(Box<dyn std::error::Error + Send + Sync>),

    /// The handler exceeded the configured per-job time limit.
    #[error("job timed out after {0:?}")]
    Timeout(Duration),
}
