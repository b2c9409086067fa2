//! Node lifecycle: creation, property-change listeners, cascading deletion.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use trellis_core::{Direction, EdgeId, NodeId, NodeKind};

use crate::error::{GraphError, Result};
use crate::graph::{EdgeCollection, Graph};

/// A property-change listener: `(graph, node, property_name)`.
pub type PropertyListener = Rc<dyn Fn(&mut Graph, NodeId, &str)>;

/// Token returned by [`Graph::on_property_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

pub(crate) struct NodeSlot {
    pub kind: NodeKind,
    pub properties: Map<String, Value>,
    pub outgoing: EdgeCollection,
    pub incoming: EdgeCollection,
    pub deleted: bool,
    /// Set while `delete_node` cascades, so no new edge can attach.
    pub deleting: bool,
    listeners: IndexMap<u64, PropertyListener>,
    next_listener: u64,
}

impl NodeSlot {
    pub fn collection(&self, direction: Direction) -> &EdgeCollection {
        match direction {
            Direction::Outgoing => &self.outgoing,
            Direction::Incoming => &self.incoming,
        }
    }

    pub fn collection_mut(&mut self, direction: Direction) -> &mut EdgeCollection {
        match direction {
            Direction::Outgoing => &mut self.outgoing,
            Direction::Incoming => &mut self.incoming,
        }
    }

    /// Deleted, or in the middle of being deleted.
    pub fn is_retired(&self) -> bool {
        self.deleted || self.deleting
    }
}

/// Read-only view of a node.
#[derive(Clone, Copy)]
pub struct NodeRef<'g> {
    id: NodeId,
    slot: &'g NodeSlot,
}

impl<'g> NodeRef<'g> {
    pub(crate) fn new(id: NodeId, slot: &'g NodeSlot) -> Self {
        Self { id, slot }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &'g NodeKind {
        &self.slot.kind
    }

    pub fn properties(&self) -> &'g Map<String, Value> {
        &self.slot.properties
    }

    pub fn property(&self, key: &str) -> Option<&'g Value> {
        self.slot.properties.get(key)
    }

    pub fn outgoing(&self) -> &'g EdgeCollection {
        &self.slot.outgoing
    }

    pub fn incoming(&self) -> &'g EdgeCollection {
        &self.slot.incoming
    }

    pub fn collection(&self, direction: Direction) -> &'g EdgeCollection {
        self.slot.collection(direction)
    }

    pub fn is_deleted(&self) -> bool {
        self.slot.deleted
    }

    pub fn listener_count(&self) -> usize {
        self.slot.listeners.len()
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.slot.kind)
            .field("outgoing", &self.slot.outgoing.len())
            .field("incoming", &self.slot.incoming.len())
            .field("deleted", &self.slot.deleted)
            .finish()
    }
}

impl Graph {
    /// Create a node with no properties.
    pub fn add_node(&mut self, kind: impl Into<NodeKind>) -> NodeId {
        self.add_node_with(kind, Map::new())
    }

    /// Create a node with initial properties.
    pub fn add_node_with(&mut self, kind: impl Into<NodeKind>, properties: Map<String, Value>) -> NodeId {
        let policy = self.config().reentrancy;
        let id = NodeId::new(self.id(), self.nodes.len());
        self.nodes.push(NodeSlot {
            kind: kind.into(),
            properties,
            outgoing: EdgeCollection::with_policy(policy),
            incoming: EdgeCollection::with_policy(policy),
            deleted: false,
            deleting: false,
            listeners: IndexMap::new(),
            next_listener: 0,
        });
        id
    }

    /// Delete a node and, first, every edge attached to it.
    ///
    /// The outgoing and incoming collections are snapshotted up front, so
    /// each edge attached at the start of the call is deleted exactly once
    /// (a self-loop appears in both snapshots but is deleted only once),
    /// whatever the edge deletions trigger along the way.
    pub fn delete_node(&mut self, node: NodeId) -> Result<()> {
        let slot = self.node_slot(node)?;
        if slot.is_retired() {
            return Err(GraphError::NodeDeleted(node));
        }
        let outgoing = slot.outgoing.snapshot();
        let incoming = slot.incoming.snapshot();

        self.node_slot_mut(node)?.deleting = true;
        let cascade = self.delete_attached(outgoing.into_iter().chain(incoming));
        let slot = self.node_slot_mut(node)?;
        slot.deleting = false;
        let removed = cascade?;

        slot.deleted = true;
        // Nothing can fire on a deleted node again.
        slot.listeners.clear();
        slot.outgoing.clear_hooks();
        slot.incoming.clear_hooks();
        tracing::debug!(node = %node, edges = removed, "Node deleted");
        Ok(())
    }

    fn delete_attached(&mut self, edges: impl Iterator<Item = EdgeId>) -> Result<usize> {
        let mut removed = 0;
        for edge in edges {
            if self.edge_slot(edge)?.deleted {
                continue;
            }
            self.delete_edge(edge)?;
            removed += 1;
        }
        Ok(removed)
    }

    // ── Properties ───────────────────────────────────────────────

    /// Listen for property changes on a node. Listeners run synchronously,
    /// in registration order, every time a change is triggered.
    pub fn on_property_change<F>(&mut self, node: NodeId, listener: F) -> Result<ListenerHandle>
    where
        F: Fn(&mut Graph, NodeId, &str) + 'static,
    {
        let slot = self.node_slot_mut(node)?;
        let id = slot.next_listener;
        slot.next_listener += 1;
        slot.listeners.insert(id, Rc::new(listener));
        Ok(ListenerHandle(id))
    }

    /// Returns `false` if the listener was already removed.
    pub fn remove_property_listener(&mut self, node: NodeId, handle: ListenerHandle) -> Result<bool> {
        Ok(self.node_slot_mut(node)?.listeners.shift_remove(&handle.0).is_some())
    }

    /// Notify every listener of `node` that `name` changed.
    ///
    /// No deduplication and no suppression of re-entrant triggers.
    pub fn trigger_property_change(&mut self, node: NodeId, name: &str) -> Result<()> {
        let listeners: Vec<PropertyListener> =
            self.node_slot(node)?.listeners.values().cloned().collect();
        for listener in listeners {
            listener(self, node, name);
        }
        Ok(())
    }

    /// Write a property and trigger a change notification for it.
    pub fn set_property(&mut self, node: NodeId, key: &str, value: Value) -> Result<Option<Value>> {
        let previous = self.node_slot_mut(node)?.properties.insert(key.to_string(), value);
        self.trigger_property_change(node, key)?;
        Ok(previous)
    }
}
