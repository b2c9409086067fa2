//! Trellis Graph — referentially consistent in-memory graph.
//!
//! This crate is the single mutation point for nodes and edges. Every change
//! to a node's adjacency flows through a [`ValidatedCollection`], so
//! validation hooks can veto it and notification hooks observe it, and an
//! edge is always present in exactly its source's outgoing collection and
//! its destination's incoming collection.

pub mod collection;
pub mod edge;
pub mod error;
pub mod graph;
pub mod node;

pub use collection::{HookHandle, Locate, ValidatedCollection, Verdict};
pub use edge::EdgeRef;
pub use error::{GraphError, Result};
pub use graph::{EdgeCollection, Graph};
pub use node::{ListenerHandle, NodeRef};
