//! Single-valued node fields backed by one outgoing edge.
//!
//! ```
//! # use trellis_graph::Graph;
//! # use trellis_bind::EdgeField;
//! let mut graph = Graph::new();
//! let doc = graph.add_node("Document");
//! let alice = graph.add_node("Person");
//!
//! let author = EdgeField::outgoing("author", "Person", "author")
//!     .required(false)
//!     .attach(&mut graph, doc)
//!     .unwrap();
//! author.set(&mut graph, Some(alice)).unwrap();
//! assert_eq!(author.get(&graph).unwrap(), Some(alice));
//! ```

use std::rc::Rc;

use trellis_core::{Direction, EdgeId, Label, NodeId, NodeKind};
use trellis_graph::{Graph, HookHandle, Verdict};
use trellis_query::Query;

use crate::error::{BindError, Result};
use crate::watch::Binding;

/// Describes a field: the edge label, the kind the target must satisfy, and
/// the property name reported on change.
#[derive(Debug, Clone)]
pub struct EdgeField {
    label: Label,
    kind: NodeKind,
    property: Rc<str>,
    required: bool,
}

impl EdgeField {
    /// A field stored as an outgoing `label` edge to a node of `kind`.
    /// Fields are required unless stated otherwise.
    pub fn outgoing(label: impl Into<Label>, kind: impl Into<NodeKind>, property: &str) -> Self {
        Self {
            label: label.into(),
            kind: kind.into(),
            property: Rc::from(property),
            required: true,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Install the field on `owner`.
    ///
    /// From now on `owner` refuses outgoing `label` edges to nodes that are
    /// not of the field's kind, and refuses a second such edge while one is
    /// present. Adding or removing the edge triggers a property change.
    pub fn attach(&self, graph: &mut Graph, owner: NodeId) -> Result<EdgeBinding> {
        graph.node(owner)?;
        let binding = Binding {
            owner,
            direction: Direction::Outgoing,
            label: self.label.clone(),
            kind: self.kind.clone(),
            property: self.property.clone(),
        };

        let guard = binding.clone();
        let mut hooks = vec![graph.on_before_add(owner, Direction::Outgoing, move |graph, edge| {
            validate(&guard, graph, *edge)
        })?];
        hooks.extend(binding.notify_on_change(graph)?);

        let kind = self.kind.clone();
        let query = Query::new()
            .through_outgoing_edge(self.label.clone())
            .filter(&format!("kind:{}", self.kind), move |graph, element| {
                element.as_node().is_some_and(|node| graph.is_a(node, &kind))
            });

        tracing::debug!(owner = %owner, label = %self.label, property = %self.property, "Edge field attached");
        Ok(EdgeBinding {
            binding,
            required: self.required,
            query,
            hooks,
        })
    }
}

fn validate(binding: &Binding, graph: &Graph, edge: EdgeId) -> Verdict {
    let Some(target) = binding.far_side(graph, edge) else {
        return Verdict::Accept;
    };
    if !binding.accepts(graph, target) {
        return Verdict::reject(format!(
            "Failed to set {}: {target} is not a {}",
            binding.property, binding.kind
        ));
    }

    let Ok(owner) = graph.node(binding.owner) else {
        return Verdict::Accept;
    };
    let existing = owner
        .outgoing()
        .iter()
        .filter_map(|e| binding.far_side(graph, *e))
        .find(|node| binding.accepts(graph, *node));
    match existing {
        Some(current) => Verdict::reject(format!(
            "Failed to set {}: {} is already connected to {current}",
            binding.property, binding.owner
        )),
        None => Verdict::Accept,
    }
}

/// A field installed on a node.
pub struct EdgeBinding {
    binding: Binding,
    required: bool,
    query: Query,
    hooks: Vec<HookHandle>,
}

impl EdgeBinding {
    pub fn owner(&self) -> NodeId {
        self.binding.owner
    }

    pub fn property(&self) -> &str {
        &self.binding.property
    }

    /// The query that reads the field.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Current value. A required field with no edge is an error, as is more
    /// than one matching edge.
    pub fn get(&self, graph: &Graph) -> Result<Option<NodeId>> {
        graph.node(self.binding.owner)?;
        let found = self.query.execute_nodes(graph, self.binding.owner);
        match found.as_slice() {
            [] if self.required => Err(BindError::Missing {
                owner: self.binding.owner,
                label: self.binding.label.clone(),
            }),
            [] => Ok(None),
            [node] => Ok(Some(*node)),
            many => Err(BindError::Multiple {
                owner: self.binding.owner,
                label: self.binding.label.clone(),
                count: many.len(),
            }),
        }
    }

    /// Replace the value: delete the current labelled edge, then connect
    /// to `value`. Returns the new edge.
    ///
    /// If the new edge is vetoed the old one stays deleted.
    pub fn set(&self, graph: &mut Graph, value: Option<NodeId>) -> Result<Option<EdgeId>> {
        let owner = self.binding.owner;
        if value.is_none() && self.required {
            return Err(BindError::RequiredUnset {
                owner,
                label: self.binding.label.clone(),
            });
        }

        if let Some(edge) = self.current_edge(graph)? {
            graph.delete_edge(edge)?;
        }

        match value {
            Some(target) => Ok(Some(graph.connect(owner, target, self.binding.label.clone())?)),
            None => Ok(None),
        }
    }

    fn current_edge(&self, graph: &Graph) -> Result<Option<EdgeId>> {
        let owner = graph.node(self.binding.owner)?;
        Ok(owner
            .outgoing()
            .iter()
            .copied()
            .find(|e| self.binding.far_side(graph, *e).is_some()))
    }

    /// Remove the field's hooks from its owner.
    pub fn detach(self, graph: &mut Graph) -> Result<()> {
        self.binding.detach(graph, &self.hooks)?;
        Ok(())
    }
}
