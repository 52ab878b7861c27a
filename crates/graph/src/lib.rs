//! Flow graph model and flattener.
//!
//! This crate provides:
//! - YAML-based flow graph deserialization (the artifact produced by the
//!   external discovery step)
//! - Structural validation: cycle detection and dangling-reference checks
//! - Flattening of the nested flow graph into independently schedulable
//!   jobs with dot-qualified names
//!
//! It does NOT depend on the scheduler or runner crates. It provides the
//! graph building blocks that the CLI wires into the scheduler loop.

mod error;
mod flatten;
mod model;

pub use error::{GraphError, Result};
pub use flatten::{flatten, ScheduledJob};
pub use model::{FlowDefinition, FlowGraph, NodeKind, NodeRef, RUN_ONCE_CRON};
