//! Handler manifest: the single place job handlers are registered.
//!
//! Entry points in the graph file resolve against this registry at
//! runtime, but the handlers themselves are linked at build time — a
//! deployment adds flows and tasks by extending [`registry`] and
//! rebuilding. The demo handlers below match `demos/flows.yaml`.

use std::time::Duration;

use takt_runner::HandlerRegistry;
use tracing::info;

/// Build the registry of all linked handlers.
pub fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();

    registry.register("demo", "flow1", || async {
        info!("flow1: crunching");
        tokio::time::sleep(Duration::from_millis(250)).await;
        Ok(())
    });

    registry.register("demo", "flow2", || async {
        info!("flow2: orchestrating");
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(())
    });

    registry.register("demo", "heartbeat", || async {
        info!("heartbeat");
        Ok(())
    });

    registry
}
