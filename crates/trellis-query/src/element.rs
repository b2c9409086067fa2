//! Graph elements flowing through a traversal frontier.

use std::fmt;

use trellis_core::{EdgeId, NodeId};

/// A node or an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Node(NodeId),
    Edge(EdgeId),
}

impl Element {
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            Self::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<EdgeId> {
        match self {
            Self::Edge(id) => Some(*id),
            Self::Node(_) => None,
        }
    }
}

impl From<NodeId> for Element {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<EdgeId> for Element {
    fn from(id: EdgeId) -> Self {
        Self::Edge(id)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => write!(f, "{id}"),
            Self::Edge(id) => write!(f, "{id}"),
        }
    }
}

/// Anything a query can start from: a single element or a sequence of them.
pub trait IntoStart {
    fn into_start(self) -> Vec<Element>;
}

impl IntoStart for Element {
    fn into_start(self) -> Vec<Element> {
        vec![self]
    }
}

impl IntoStart for NodeId {
    fn into_start(self) -> Vec<Element> {
        vec![Element::Node(self)]
    }
}

impl IntoStart for EdgeId {
    fn into_start(self) -> Vec<Element> {
        vec![Element::Edge(self)]
    }
}

impl<E: Into<Element>> IntoStart for Vec<E> {
    fn into_start(self) -> Vec<Element> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<E: Into<Element> + Copy> IntoStart for &[E] {
    fn into_start(self) -> Vec<Element> {
        self.iter().map(|e| (*e).into()).collect()
    }
}

impl<E: Into<Element>, const N: usize> IntoStart for [E; N] {
    fn into_start(self) -> Vec<Element> {
        self.into_iter().map(Into::into).collect()
    }
}
