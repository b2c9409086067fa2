//! Multi-valued node lists backed by labelled edges.

use std::rc::Rc;

use trellis_core::{Direction, EdgeId, Label, NodeId, NodeKind};
use trellis_graph::{Graph, HookHandle, Verdict};
use trellis_query::Query;

use crate::error::Result;
use crate::watch::Binding;

/// The nodes across a parent's `label` edges in one direction.
///
/// Only nodes of the list's kind can be connected through the label, and
/// every insertion or removal triggers a property change on the parent.
pub struct NodeList {
    binding: Binding,
    query: Query,
    hooks: Vec<HookHandle>,
}

impl NodeList {
    pub fn attach(
        graph: &mut Graph,
        parent: NodeId,
        direction: Direction,
        label: impl Into<Label>,
        kind: impl Into<NodeKind>,
        property: &str,
    ) -> Result<Self> {
        graph.node(parent)?;
        let binding = Binding {
            owner: parent,
            direction,
            label: label.into(),
            kind: kind.into(),
            property: Rc::from(property),
        };

        let guard = binding.clone();
        let mut hooks = vec![graph.on_before_add(parent, direction, move |graph, edge| {
            match guard.far_side(graph, *edge) {
                Some(item) if !guard.accepts(graph, item) => Verdict::reject(format!(
                    "Failed to add node to {}: {item} is not a {}",
                    guard.property, guard.kind
                )),
                _ => Verdict::Accept,
            }
        })?];
        hooks.extend(binding.notify_on_change(graph)?);

        let query = Query::new().through_edge(direction, binding.label.clone());
        Ok(Self {
            binding,
            query,
            hooks,
        })
    }

    /// A list of the destinations of `parent`'s outgoing `label` edges.
    pub fn outgoing(
        graph: &mut Graph,
        parent: NodeId,
        label: impl Into<Label>,
        kind: impl Into<NodeKind>,
        property: &str,
    ) -> Result<Self> {
        Self::attach(graph, parent, Direction::Outgoing, label, kind, property)
    }

    /// A list of the sources of `parent`'s incoming `label` edges.
    pub fn incoming(
        graph: &mut Graph,
        parent: NodeId,
        label: impl Into<Label>,
        kind: impl Into<NodeKind>,
        property: &str,
    ) -> Result<Self> {
        Self::attach(graph, parent, Direction::Incoming, label, kind, property)
    }

    pub fn parent(&self) -> NodeId {
        self.binding.owner
    }

    pub fn direction(&self) -> Direction {
        self.binding.direction
    }

    /// Connect `item`, oriented by the list's direction.
    pub fn push(&self, graph: &mut Graph, item: NodeId) -> Result<EdgeId> {
        let parent = self.binding.owner;
        let label = self.binding.label.clone();
        let edge = match self.binding.direction {
            Direction::Outgoing => graph.connect(parent, item, label)?,
            Direction::Incoming => graph.connect(item, parent, label)?,
        };
        Ok(edge)
    }

    /// Current members, in edge insertion order. Duplicates appear once per
    /// connecting edge.
    pub fn to_vec(&self, graph: &Graph) -> Vec<NodeId> {
        self.query.execute_nodes(graph, self.binding.owner)
    }

    pub fn len(&self, graph: &Graph) -> usize {
        self.to_vec(graph).len()
    }

    pub fn is_empty(&self, graph: &Graph) -> bool {
        self.len(graph) == 0
    }

    /// The single step that reads this list from its parent.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// `base` extended with this list's step, for chaining from any frontier.
    pub fn step(&self, base: &Query) -> Query {
        base.through_edge(self.binding.direction, self.binding.label.clone())
    }

    /// Remove the list's hooks from its parent.
    pub fn detach(self, graph: &mut Graph) -> Result<()> {
        self.binding.detach(graph, &self.hooks)?;
        Ok(())
    }
}
