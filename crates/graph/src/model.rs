//! In-memory flow graph model, loaded from the discovery artifact.
//!
//! The external discovery step inspects user source and emits a YAML
//! mapping of flow name to flow definition. This module deserializes that
//! artifact as-is; structural checks happen in [`crate::flatten`].

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Cron value reserved to mean "run exactly once per scheduler lifetime".
///
/// This is also the default when a flow declares no cron. The literal
/// collides with a real every-minute expression, so every-minute execution
/// is not expressible through this value; `*/1 * * * *` is treated as a
/// genuine cron schedule.
pub const RUN_ONCE_CRON: &str = "* * * * *";

fn default_cron() -> String {
    RUN_ONCE_CRON.to_string()
}

/// Kind discriminator carried by graph node references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "TASK")]
    Task,
    #[serde(rename = "FLOW")]
    Flow,
}

/// Reference to a child node (task or nested flow) declared by a flow.
///
/// Tasks are leaf units invoked from inside the flow's own logic; they are
/// never independently scheduled. Flow references are re-expanded from the
/// graph during flattening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub entry_point: String,
}

/// One flow definition as emitted by the discovery step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowDefinition {
    /// `"module:function"` reference; empty for flows that only orchestrate.
    #[serde(default)]
    pub entry_point: String,
    /// 5-field cron expression, or [`RUN_ONCE_CRON`].
    #[serde(default = "default_cron")]
    pub cron: String,
    /// Leaf tasks this flow invokes.
    #[serde(default)]
    pub tasks: Vec<NodeRef>,
    /// Nested flows this flow calls, re-expanded during flattening.
    #[serde(default)]
    pub flows: Vec<NodeRef>,
    /// Source file the flow was discovered in.
    #[serde(default)]
    pub file_name: String,
}

/// The full flow graph: an ordered mapping of flow name to definition.
///
/// Iteration order follows the artifact's author order, which keeps
/// flattening deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowGraph {
    pub flows: IndexMap<String, FlowDefinition>,
}

impl FlowGraph {
    /// Deserialize a flow graph from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a flow graph from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let graph = Self::from_yaml_str(&contents)?;
        debug!(path = %path.display(), flows = graph.len(), "loaded flow graph");
        Ok(graph)
    }

    /// Look up a flow definition by name.
    pub fn get(&self, name: &str) -> Option<&FlowDefinition> {
        self.flows.get(name)
    }

    /// Number of flows in the graph.
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    /// Whether the graph has no flows.
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
