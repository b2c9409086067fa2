//! Core domain types for the Trellis graph.
//!
//! Nodes and edges live in a per-graph arena and are addressed by copyable
//! identifiers. Every identifier carries the [`GraphId`] of the arena that
//! issued it, so an id handed to the wrong graph is detected instead of
//! silently aliasing another slot.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Graph ─────────────────────────────────────────────────────────

/// Identity of a single in-memory graph instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GraphId(pub Uuid);

impl GraphId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Node / Edge identifiers ───────────────────────────────────────

/// Identifier of a node: the issuing graph plus a dense arena slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub graph: GraphId,
    pub slot: usize,
}

impl NodeId {
    pub fn new(graph: GraphId, slot: usize) -> Self {
        Self { graph, slot }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.slot)
    }
}

/// Identifier of an edge: the issuing graph plus a dense arena slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EdgeId {
    pub graph: GraphId,
    pub slot: usize,
}

impl EdgeId {
    pub fn new(graph: GraphId, slot: usize) -> Self {
        Self { graph, slot }
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge#{}", self.slot)
    }
}

// ── Labels and kinds ──────────────────────────────────────────────

/// The semantic role of an edge ("child", "owner", ...). Not unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&Label> for Label {
    fn from(value: &Label) -> Self {
        value.clone()
    }
}

impl PartialEq<str> for Label {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Label {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability tag carried by every node ("Person", "Document", ...).
///
/// Subtype relationships between kinds are registered on the graph, which
/// answers "is this node a `Person`?" without runtime type introspection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeKind(String);

impl NodeKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeKind {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeKind {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&NodeKind> for NodeKind {
    fn from(value: &NodeKind) -> Self {
        value.clone()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Directions, endpoints, channels ───────────────────────────────

/// Which adjacency collection of a node, or which way a traversal step walks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Edges whose source is the node.
    Outgoing,
    /// Edges whose destination is the node.
    Incoming,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Outgoing => Self::Incoming,
            Self::Incoming => Self::Outgoing,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outgoing => f.write_str("outgoing"),
            Self::Incoming => f.write_str("incoming"),
        }
    }
}

/// One end of an edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Source,
    Destination,
}

impl Endpoint {
    /// The collection of the endpoint node that holds the edge.
    pub fn direction(self) -> Direction {
        match self {
            Self::Source => Direction::Outgoing,
            Self::Destination => Direction::Incoming,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Destination => f.write_str("destination"),
        }
    }
}

/// Event channel of a validated collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Runs before insertion; may veto.
    BeforeAdd,
    /// Runs after every accepted insertion.
    AfterAdd,
    /// Runs before removal; may veto.
    BeforeDelete,
    /// Runs after a removal that changed membership.
    AfterDelete,
}

impl Channel {
    pub fn is_before(self) -> bool {
        matches!(self, Self::BeforeAdd | Self::BeforeDelete)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BeforeAdd => "before_add",
            Self::AfterAdd => "after_add",
            Self::BeforeDelete => "before_delete",
            Self::AfterDelete => "after_delete",
        };
        f.write_str(name)
    }
}
