//! Error types for graph mutation.

use thiserror::Error;
use trellis_core::{EdgeId, Endpoint, NodeId};

/// Errors from graph and collection operations.
///
/// Every variant is raised synchronously at the point of violation and the
/// operation that raised it leaves the graph unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A validation callback vetoed an add or delete.
    #[error("{reason}")]
    Validation { reason: String },

    #[error("Node {0} is already deleted")]
    NodeDeleted(NodeId),

    #[error("Edge {0} is already deleted")]
    EdgeDeleted(EdgeId),

    #[error("Tried to set deleted node {node} as the {endpoint} of an edge")]
    DeletedEndpoint { node: NodeId, endpoint: Endpoint },

    #[error("Tried to set the {endpoint} of initialized edge {edge}")]
    EndpointReassigned { edge: EdgeId, endpoint: Endpoint },

    #[error("Node not found: {0}")]
    UnknownNode(NodeId),

    #[error("Edge not found: {0}")]
    UnknownEdge(EdgeId),

    #[error("Re-entrant {operation} rejected: collection is already mid-mutation")]
    Reentrant { operation: &'static str },
}

impl GraphError {
    /// Whether this error is an integrity violation (as opposed to a veto).
    pub fn is_integrity_violation(&self) -> bool {
        !matches!(self, Self::Validation { .. } | Self::Reentrant { .. })
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
