//! Flattens the nested flow graph into a linear list of schedulable jobs.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;
use tracing::debug;

use crate::error::{GraphError, Result};
use crate::model::{FlowGraph, NodeRef};

/// One independently schedulable job produced by flattening.
///
/// `qualified_name` is the dot-joined chain of ancestor flow names down to
/// this flow (the bare name for a top-level flow). Unique within one
/// flattening pass as long as the graph is acyclic and no two sibling
/// flows share a name.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledJob {
    pub qualified_name: String,
    pub cron: String,
    pub entry_point: String,
    pub child_tasks: Vec<NodeRef>,
}

/// Flatten a flow graph into an ordered list of [`ScheduledJob`]s.
///
/// Traversal is breadth-first from the root set: every flow that no other
/// flow references as a nested child. A flow reachable only through a
/// parent is scheduled solely under that parent's prefix. Nested flows are
/// re-expanded from their own stored definition, so one definition can
/// yield several jobs with different qualified names.
///
/// Flows with an empty `entry_point` are traversed (their children are
/// still scheduled) but emit no job themselves.
///
/// Fails with [`GraphError::CyclicGraph`] before traversal if nested-flow
/// references form a cycle, and with [`GraphError::DanglingReference`] if
/// a referenced flow is absent from the graph.
pub fn flatten(graph: &FlowGraph) -> Result<Vec<ScheduledJob>> {
    detect_cycles(graph)?;

    let nested: HashSet<&str> = graph
        .flows
        .values()
        .flat_map(|def| def.flows.iter().map(|r| r.name.as_str()))
        .collect();

    let mut queue: VecDeque<(String, Option<String>)> = graph
        .flows
        .keys()
        .filter(|name| !nested.contains(name.as_str()))
        .map(|name| (name.clone(), None))
        .collect();

    let mut jobs = Vec::new();

    while let Some((name, parent)) = queue.pop_front() {
        // Root names come from the graph's own keys; only nested references
        // can dangle, and those are checked before being enqueued below.
        let def = match graph.get(&name) {
            Some(def) => def,
            None => continue,
        };

        let qualified_name = match &parent {
            Some(parent) => format!("{}.{}", parent, name),
            None => name.clone(),
        };

        for nested_ref in &def.flows {
            if graph.get(&nested_ref.name).is_none() {
                return Err(GraphError::DanglingReference {
                    parent: name.clone(),
                    name: nested_ref.name.clone(),
                });
            }
            queue.push_back((nested_ref.name.clone(), Some(qualified_name.clone())));
        }

        if !def.entry_point.is_empty() {
            debug!(
                flow = %qualified_name,
                cron = %def.cron,
                entry_point = %def.entry_point,
                "scheduled flow"
            );
            jobs.push(ScheduledJob {
                qualified_name,
                cron: def.cron.clone(),
                entry_point: def.entry_point.clone(),
                child_tasks: def.tasks.clone(),
            });
        }
    }

    Ok(jobs)
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

/// Reject nested-flow reference cycles up front; BFS over a cyclic graph
/// would never terminate. References to absent flows are ignored here so
/// the traversal can report them with parent context.
fn detect_cycles(graph: &FlowGraph) -> Result<()> {
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    for name in graph.flows.keys() {
        visit(graph, name, &mut marks)?;
    }
    Ok(())
}

fn visit<'a>(graph: &'a FlowGraph, name: &'a str, marks: &mut HashMap<&'a str, Mark>) -> Result<()> {
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::InProgress) => return Err(GraphError::CyclicGraph(name.to_string())),
        None => {}
    }
    marks.insert(name, Mark::InProgress);
    if let Some(def) = graph.get(name) {
        for nested_ref in &def.flows {
            visit(graph, &nested_ref.name, marks)?;
        }
    }
    marks.insert(name, Mark::Done);
    Ok(())
}
