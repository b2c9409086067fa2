//! Provenance paths: how a traversal result was reached.
//!
//! A [`Path`] is a persistent list. Extending it allocates one link that
//! points at the existing path, so every frontier entry shares its prefix
//! with the entry it came from and no path is ever mutated after creation.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use trellis_core::{Direction, Label};

use crate::element::Element;

/// The kind of pipeline step that produced a path step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    ThroughOutgoingEdge,
    ThroughIncomingEdge,
    Filter,
}

impl StepKind {
    pub fn through(direction: Direction) -> Self {
        match direction {
            Direction::Outgoing => Self::ThroughOutgoingEdge,
            Direction::Incoming => Self::ThroughIncomingEdge,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ThroughOutgoingEdge => "out",
            Self::ThroughIncomingEdge => "in",
            Self::Filter => "filter",
        };
        f.write_str(name)
    }
}

/// Parameters of a path step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepData {
    /// The edge label an edge step followed.
    Label(Label),
    /// The name a filter was registered under.
    Predicate(Rc<str>),
}

impl fmt::Display for StepData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => write!(f, "{label}"),
            Self::Predicate(name) => f.write_str(name),
        }
    }
}

/// One recorded step: the element it was taken from, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub source: Element,
    pub kind: StepKind,
    pub data: StepData,
}

struct Link {
    step: PathStep,
    parent: Path,
}

/// Immutable, prefix-sharing sequence of [`PathStep`]s.
#[derive(Clone, Default)]
pub struct Path {
    head: Option<Rc<Link>>,
    len: usize,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// A new path with `step` appended; `self` is left untouched.
    pub fn extended(&self, step: PathStep) -> Path {
        Path {
            head: Some(Rc::new(Link {
                step,
                parent: self.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// The most recent step.
    pub fn last(&self) -> Option<&PathStep> {
        self.head.as_ref().map(|link| &link.step)
    }

    /// Steps from the start element onward.
    pub fn steps(&self) -> Vec<&PathStep> {
        let mut steps = Vec::with_capacity(self.len);
        let mut current = self;
        while let Some(link) = &current.head {
            steps.push(&link.step);
            current = &link.parent;
        }
        steps.reverse();
        steps
    }

    /// Whether both paths are the same allocation (shared history).
    pub fn ptr_eq(&self, other: &Path) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.steps()).finish()
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.steps() == other.steps()
    }
}

/// A frontier entry: an element plus the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    pub element: Element,
    pub path: Path,
}

impl Traversal {
    /// A start entry with an empty path.
    pub fn start(element: Element) -> Self {
        Self {
            element,
            path: Path::new(),
        }
    }

    /// The entry reached from `self` by `step`.
    pub fn advance(&self, element: Element, kind: StepKind, data: StepData) -> Self {
        Self {
            element,
            path: self.path.extended(PathStep {
                source: self.element,
                kind,
                data,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use trellis_core::{GraphId, NodeId};

    use super::*;

    fn node(slot: usize, graph: GraphId) -> Element {
        Element::Node(NodeId::new(graph, slot))
    }

    #[test]
    fn test_extension_shares_prefix() {
        let graph = GraphId::new();
        let start = Traversal::start(node(0, graph));
        let first = start.advance(node(1, graph), StepKind::ThroughOutgoingEdge, StepData::Label("a".into()));
        let left = first.advance(node(2, graph), StepKind::ThroughOutgoingEdge, StepData::Label("b".into()));
        let right = first.advance(node(3, graph), StepKind::ThroughIncomingEdge, StepData::Label("c".into()));

        assert!(start.path.is_empty());
        assert_eq!(first.path.len(), 1);
        assert_eq!(left.path.len(), 2);
        assert_eq!(right.path.len(), 2);
        assert_eq!(left.path.steps()[0], right.path.steps()[0]);
        assert!(std::ptr::eq(left.path.steps()[0], right.path.steps()[0]));
    }

    #[test]
    fn test_steps_in_order() {
        let graph = GraphId::new();
        let entry = Traversal::start(node(0, graph))
            .advance(node(1, graph), StepKind::ThroughOutgoingEdge, StepData::Label("a".into()))
            .advance(node(1, graph), StepKind::Filter, StepData::Predicate(Rc::from("keep")));

        let steps = entry.path.steps();
        assert_eq!(steps[0].source, node(0, graph));
        assert_eq!(steps[0].kind, StepKind::ThroughOutgoingEdge);
        assert_eq!(steps[1].source, node(1, graph));
        assert_eq!(steps[1].data.to_string(), "keep");
        assert_eq!(entry.path.last().map(|s| s.kind), Some(StepKind::Filter));
    }
}
