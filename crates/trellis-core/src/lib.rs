//! trellis-core: Shared identifiers, configuration, and error handling for Trellis.
//!
//! This crate provides the foundational types used across all Trellis crates:
//! - Graph, node, and edge identifiers
//! - Edge labels and node kinds (capability tags)
//! - Adjacency directions and collection event channels
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{GraphConfig, LogConfig, ReentrancyPolicy, TrellisConfig};
pub use error::TrellisError;
pub use types::{Channel, Direction, EdgeId, Endpoint, GraphId, Label, NodeId, NodeKind};
