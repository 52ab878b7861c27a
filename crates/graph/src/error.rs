//! Error types for graph loading and flattening.

use thiserror::Error;

/// Errors that can occur while loading or flattening a flow graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A flow references a nested flow that is absent from the graph.
    #[error("flow '{parent}' references unknown flow '{name}'")]
    DanglingReference { parent: String, name: String },

    /// Nested-flow references form a cycle; traversal would not terminate.
    #[error("cycle detected in nested flow references involving '{0}'")]
    CyclicGraph(String),
}

/// Result alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
