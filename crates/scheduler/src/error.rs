use thiserror::Error;

/// Errors raised while building a schedule from flattened jobs.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A job carries a cron expression the `cron` crate cannot parse.
    #[error("invalid cron expression '{expr}' for flow '{flow}': {source}")]
    InvalidCron {
        flow: String,
        expr: String,
        #[source]
        source: cron::error::Error,
    },
}
