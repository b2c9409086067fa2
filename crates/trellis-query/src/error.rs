//! Error types for the trellis-query crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Graph error: {0}")]
    Graph(#[from] trellis_graph::GraphError),

    #[error("Node not found in fixture: {name}")]
    UnknownNode { name: String },

    #[error("Duplicate node name in fixture: {name}")]
    DuplicateNode { name: String },

    #[error("Invalid step '{step}': {reason}")]
    InvalidStep { step: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, QueryError>;
