//! takt — cron-driven flow scheduler.

mod cli;
mod handlers;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use takt_graph::{flatten, FlowGraph, ScheduledJob, RUN_ONCE_CRON};
use takt_runner::{WorkerPool, WorkerPoolConfig};
use takt_scheduler::Scheduler;
use takt_store::{ExecutionStore, Recorder};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Validate { graph, json } => validate(&graph, json),
        Command::Run {
            graph,
            db,
            workers,
            tick_secs,
            job_timeout_secs,
        } => {
            run(
                &graph,
                &db,
                workers,
                Duration::from_secs(tick_secs),
                job_timeout_secs.map(Duration::from_secs),
            )
            .await
        }
    }
}

/// Load and flatten the graph at `path`, failing with context on any
/// structural or cron error.
fn build_schedule(path: &Path) -> Result<Vec<ScheduledJob>> {
    let graph = FlowGraph::from_yaml_file(path)
        .with_context(|| format!("failed to load flow graph from {}", path.display()))?;
    let jobs = flatten(&graph).context("flow graph failed validation")?;
    // Surface invalid cron expressions here too; the run path reuses the
    // parsed schedule.
    Scheduler::new(jobs.clone()).context("flow graph contains an invalid cron expression")?;
    Ok(jobs)
}

fn validate(path: &Path, json: bool) -> Result<()> {
    let jobs = build_schedule(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
        return Ok(());
    }

    println!("{} schedulable job(s):", jobs.len());
    for job in &jobs {
        let trigger = if job.cron.trim() == RUN_ONCE_CRON {
            "run once".to_string()
        } else {
            job.cron.clone()
        };
        println!(
            "  {:<30} [{}] -> {} ({} task(s))",
            job.qualified_name,
            trigger,
            job.entry_point,
            job.child_tasks.len()
        );
    }
    Ok(())
}

async fn run(
    path: &Path,
    db: &str,
    workers: usize,
    tick: Duration,
    job_timeout: Option<Duration>,
) -> Result<()> {
    let jobs = build_schedule(path)?;
    anyhow::ensure!(!jobs.is_empty(), "flow graph contains no schedulable flows");

    let scheduler = Scheduler::with_tick(jobs, tick)
        .context("flow graph contains an invalid cron expression")?;

    let db_url = if db.starts_with("sqlite:") {
        db.to_string()
    } else {
        format!("sqlite://{}", db)
    };
    let store = ExecutionStore::connect(&db_url)
        .await
        .with_context(|| format!("failed to open execution record store at {db_url}"))?;
    store
        .ensure_schema()
        .await
        .context("failed to prepare execution record schema")?;
    let (recorder, recorder_task) = Recorder::spawn(store);

    let registry = Arc::new(handlers::registry());
    info!(handlers = registry.len(), jobs = scheduler.len(), "starting");

    let pool = WorkerPool::start(
        WorkerPoolConfig {
            workers,
            job_timeout,
        },
        registry,
        recorder,
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    scheduler.run(pool, shutdown_rx).await;

    // The pool was consumed by the loop and dropped with it; once in-flight
    // jobs release their recorder handles the actor drains and exits.
    if tokio::time::timeout(Duration::from_secs(5), recorder_task)
        .await
        .is_err()
    {
        info!("recorder still draining at exit");
    }
    Ok(())
}
