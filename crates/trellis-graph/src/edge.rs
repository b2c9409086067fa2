//! Edge lifecycle: construction, endpoint assignment, deletion.
//!
//! An edge registers itself into its endpoints' collections: construction
//! inserts it into `source.outgoing` and then `destination.incoming`, and
//! deletion removes it from both. Both go through the collections' validated
//! protocol, so hooks registered on either endpoint can veto or observe.

use std::fmt;

use trellis_core::{Direction, EdgeId, Endpoint, Label, NodeId};

use crate::collection::{Locate, ValidatedCollection};
use crate::error::{GraphError, Result};
use crate::graph::{Graph, NodeCollection};

#[derive(Debug, Clone)]
pub(crate) struct EdgeSlot {
    pub label: Label,
    pub source: NodeId,
    pub destination: NodeId,
    pub deleted: bool,
    pub initialized: bool,
}

impl EdgeSlot {
    fn endpoint(&self, endpoint: Endpoint) -> NodeId {
        match endpoint {
            Endpoint::Source => self.source,
            Endpoint::Destination => self.destination,
        }
    }
}

/// Read-only view of an edge.
#[derive(Clone, Copy)]
pub struct EdgeRef<'g> {
    id: EdgeId,
    slot: &'g EdgeSlot,
}

impl<'g> EdgeRef<'g> {
    pub(crate) fn new(id: EdgeId, slot: &'g EdgeSlot) -> Self {
        Self { id, slot }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn label(&self) -> &'g Label {
        &self.slot.label
    }

    /// The last assigned source; available after deletion too.
    pub fn source(&self) -> NodeId {
        self.slot.source
    }

    /// The last assigned destination; available after deletion too.
    pub fn destination(&self) -> NodeId {
        self.slot.destination
    }

    pub fn endpoint(&self, endpoint: Endpoint) -> NodeId {
        self.slot.endpoint(endpoint)
    }

    /// The node on the far side when this edge is reached through a node's
    /// `direction` collection: the destination of an outgoing edge, the
    /// source of an incoming one.
    pub fn neighbor(&self, direction: Direction) -> NodeId {
        match direction {
            Direction::Outgoing => self.slot.destination,
            Direction::Incoming => self.slot.source,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.slot.deleted
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.initialized
    }
}

impl fmt::Debug for EdgeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("id", &self.id)
            .field("label", &self.slot.label)
            .field("source", &self.slot.source)
            .field("destination", &self.slot.destination)
            .field("deleted", &self.slot.deleted)
            .finish()
    }
}

impl fmt::Display for EdgeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Edge(label={}, source={}, destination={})",
            self.slot.label, self.slot.source, self.slot.destination
        )
    }
}

impl Graph {
    /// Construct an edge from `source` to `destination`.
    ///
    /// Assigns the source (inserting into `source.outgoing`), then the
    /// destination (inserting into `destination.incoming`), and only then
    /// marks the edge initialized. If the destination insertion is vetoed the
    /// source insertion is rolled back and the edge is discarded, so a failed
    /// construction leaves no trace in either collection.
    pub fn connect(&mut self, source: NodeId, destination: NodeId, label: impl Into<Label>) -> Result<EdgeId> {
        self.ensure_attachable(source, Endpoint::Source)?;
        self.ensure_attachable(destination, Endpoint::Destination)?;

        let label = label.into();
        let edge = EdgeId::new(self.id(), self.edges.len());
        self.edges.push(EdgeSlot {
            label,
            source,
            destination,
            deleted: false,
            initialized: false,
        });

        if let Err(e) = self.set_edge_source(edge, source) {
            self.discard(edge);
            return Err(e);
        }
        if let Err(e) = self.set_edge_destination(edge, destination) {
            self.roll_back_insertion(NodeCollection::new(source, Direction::Outgoing), edge);
            self.discard(edge);
            return Err(e);
        }

        let slot = self.edge_slot_mut(edge)?;
        // A hook may have deleted an endpoint, and with it this edge.
        if slot.deleted {
            return Err(GraphError::EdgeDeleted(edge));
        }
        slot.initialized = true;
        tracing::debug!(
            edge = %edge,
            label = %slot.label,
            source = %source,
            destination = %destination,
            "Edge created"
        );
        Ok(edge)
    }

    /// Assign the source of an edge that is still under construction.
    ///
    /// Fails once the edge is initialized or deleted; endpoints are
    /// write-once.
    pub fn set_edge_source(&mut self, edge: EdgeId, node: NodeId) -> Result<()> {
        self.assign_endpoint(edge, node, Endpoint::Source)
    }

    /// Assign the destination of an edge that is still under construction.
    pub fn set_edge_destination(&mut self, edge: EdgeId, node: NodeId) -> Result<()> {
        self.assign_endpoint(edge, node, Endpoint::Destination)
    }

    fn assign_endpoint(&mut self, edge: EdgeId, node: NodeId, endpoint: Endpoint) -> Result<()> {
        let slot = self.edge_slot(edge)?;
        if slot.deleted {
            return Err(GraphError::EdgeDeleted(edge));
        }
        let initialized = slot.initialized;
        self.ensure_attachable(node, endpoint)?;
        if initialized {
            return Err(GraphError::EndpointReassigned { edge, endpoint });
        }

        let slot = self.edge_slot_mut(edge)?;
        match endpoint {
            Endpoint::Source => slot.source = node,
            Endpoint::Destination => slot.destination = node,
        }
        ValidatedCollection::add(self, NodeCollection::new(node, endpoint.direction()), edge)
    }

    /// Delete an edge, removing it from both endpoints' collections.
    ///
    /// If the destination side vetoes the removal, the source side is
    /// restored and the veto is returned. When the source node was deleted
    /// in the meantime there is nothing to restore into, so the edge is
    /// dropped from the destination unchecked and the veto still returned.
    pub fn delete_edge(&mut self, edge: EdgeId) -> Result<()> {
        let slot = self.edge_slot(edge)?;
        if slot.deleted {
            return Err(GraphError::EdgeDeleted(edge));
        }
        let (source, destination) = (slot.source, slot.destination);

        let outgoing = NodeCollection::new(source, Direction::Outgoing);
        let removed = ValidatedCollection::delete(self, outgoing, &edge)?;

        let incoming = NodeCollection::new(destination, Direction::Incoming);
        if let Err(e) = ValidatedCollection::delete(self, incoming, &edge) {
            if self.node_slot(source)?.deleted {
                if self.remove_unchecked(incoming, edge) {
                    tracing::warn!(
                        edge = %edge,
                        node = %destination,
                        "Dropped edge of deleted source despite veto"
                    );
                }
                self.edge_slot_mut(edge)?.deleted = true;
            } else if removed {
                self.restore_membership(outgoing, edge);
            }
            return Err(e);
        }

        self.edge_slot_mut(edge)?.deleted = true;
        tracing::debug!(edge = %edge, source = %source, destination = %destination, "Edge deleted");
        Ok(())
    }

    fn ensure_attachable(&self, node: NodeId, endpoint: Endpoint) -> Result<()> {
        if self.node_slot(node)?.is_retired() {
            return Err(GraphError::DeletedEndpoint { node, endpoint });
        }
        Ok(())
    }

    fn discard(&mut self, edge: EdgeId) {
        if let Ok(slot) = self.edge_slot_mut(edge) {
            slot.deleted = true;
        }
    }

    /// Undo an accepted insertion so observers of the add see it reversed.
    fn roll_back_insertion(&mut self, target: NodeCollection, edge: EdgeId) {
        if self.remove_unchecked(target, edge) {
            tracing::warn!(edge = %edge, node = %target.node, "Rolled back partial edge insertion");
        }
    }

    /// Remove without validation, then notify `after_delete` listeners.
    /// Returns whether `edge` was a member.
    fn remove_unchecked(&mut self, target: NodeCollection, edge: EdgeId) -> bool {
        if !target.locate(self).remove_raw(&edge) {
            return false;
        }
        let hooks = target.locate(self).after_delete_hooks();
        for hook in hooks {
            hook(self, &edge);
        }
        true
    }

    /// Undo an accepted removal: re-insert without validation, then notify
    /// `after_add` listeners.
    fn restore_membership(&mut self, target: NodeCollection, edge: EdgeId) {
        if !target.locate(self).insert_raw(edge) {
            return;
        }
        tracing::warn!(edge = %edge, node = %target.node, "Restored edge after vetoed deletion");
        let hooks = target.locate(self).after_add_hooks();
        for hook in hooks {
            hook(self, &edge);
        }
    }
}
