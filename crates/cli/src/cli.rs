use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cron-driven flow scheduler.
///
/// Loads a flow graph artifact (produced by the external discovery step),
/// flattens it into schedulable jobs, and either prints the resulting
/// schedule or runs the tick loop against the built-in handler manifest.
#[derive(Parser, Debug)]
#[command(name = "takt", version, about = "Cron-driven flow scheduler")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a flow graph, validate it, and print the flattened schedule.
    Validate {
        /// Path to the flow graph YAML file.
        #[arg(long, env = "TAKT_GRAPH", default_value = "flows_and_tasks.yaml")]
        graph: PathBuf,

        /// Print the schedule as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Load a flow graph and run the scheduler loop until ctrl-c.
    Run {
        /// Path to the flow graph YAML file.
        #[arg(long, env = "TAKT_GRAPH", default_value = "flows_and_tasks.yaml")]
        graph: PathBuf,

        /// SQLite database for execution records.
        #[arg(long, env = "TAKT_DB", default_value = "takt.db")]
        db: String,

        /// Concurrent job slots in the worker pool.
        #[arg(long, env = "TAKT_WORKERS", default_value_t = 4)]
        workers: usize,

        /// Tick period in seconds.
        #[arg(long, env = "TAKT_TICK_SECS", default_value_t = 60)]
        tick_secs: u64,

        /// Per-job timeout in seconds (no timeout if unset).
        #[arg(long, env = "TAKT_JOB_TIMEOUT_SECS")]
        job_timeout_secs: Option<u64>,
    },
}
