//! Error types for the trellis-bind crate.

use thiserror::Error;
use trellis_core::{Label, NodeId};
use trellis_graph::GraphError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("No outgoing '{label}' edge found on {owner}")]
    Missing { owner: NodeId, label: Label },

    #[error("Multiple outgoing '{label}' edges found on {owner}: {count}")]
    Multiple {
        owner: NodeId,
        label: Label,
        count: usize,
    },

    #[error("Cannot unset required '{label}' edge on {owner}")]
    RequiredUnset { owner: NodeId, label: Label },
}

pub type Result<T> = std::result::Result<T, BindError>;
