//! The graph arena.
//!
//! Nodes and edges refer to each other (a node's collections hold edge ids,
//! an edge holds its two endpoint node ids), so both live in dense slot
//! vectors owned by [`Graph`] and are addressed by id. Slots are never
//! reused; deletion is logical.

use std::collections::HashMap;
use std::fmt;

use trellis_core::{Direction, EdgeId, GraphConfig, GraphId, NodeId, NodeKind};

use crate::collection::{HookHandle, Locate, ValidatedCollection, Verdict};
use crate::edge::{EdgeRef, EdgeSlot};
use crate::error::{GraphError, Result};
use crate::node::{NodeRef, NodeSlot};

/// A node's outgoing or incoming adjacency collection.
pub type EdgeCollection = ValidatedCollection<EdgeId, Graph>;

/// In-memory directed, labeled graph with enforced referential integrity.
pub struct Graph {
    id: GraphId,
    config: GraphConfig,
    pub(crate) nodes: Vec<NodeSlot>,
    pub(crate) edges: Vec<EdgeSlot>,
    /// Kind → parent kind.
    kinds: HashMap<NodeKind, Option<NodeKind>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            id: GraphId::new(),
            config,
            nodes: Vec::new(),
            edges: Vec::new(),
            kinds: HashMap::new(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    // ── Lookup ───────────────────────────────────────────────────

    /// Read-only view of a node. Deleted nodes stay readable.
    pub fn node(&self, id: NodeId) -> Result<NodeRef<'_>> {
        Ok(NodeRef::new(id, self.node_slot(id)?))
    }

    /// Read-only view of an edge. Deleted edges stay readable.
    pub fn edge(&self, id: EdgeId) -> Result<EdgeRef<'_>> {
        Ok(EdgeRef::new(id, self.edge_slot(id)?))
    }

    pub(crate) fn node_slot(&self, id: NodeId) -> Result<&NodeSlot> {
        if id.graph != self.id {
            return Err(GraphError::UnknownNode(id));
        }
        self.nodes.get(id.slot).ok_or(GraphError::UnknownNode(id))
    }

    pub(crate) fn node_slot_mut(&mut self, id: NodeId) -> Result<&mut NodeSlot> {
        if id.graph != self.id {
            return Err(GraphError::UnknownNode(id));
        }
        self.nodes.get_mut(id.slot).ok_or(GraphError::UnknownNode(id))
    }

    pub(crate) fn edge_slot(&self, id: EdgeId) -> Result<&EdgeSlot> {
        if id.graph != self.id {
            return Err(GraphError::UnknownEdge(id));
        }
        self.edges.get(id.slot).ok_or(GraphError::UnknownEdge(id))
    }

    pub(crate) fn edge_slot_mut(&mut self, id: EdgeId) -> Result<&mut EdgeSlot> {
        if id.graph != self.id {
            return Err(GraphError::UnknownEdge(id));
        }
        self.edges.get_mut(id.slot).ok_or(GraphError::UnknownEdge(id))
    }

    /// Ids of all nodes that are not deleted.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.deleted)
            .map(|(slot, _)| NodeId::new(self.id, slot))
    }

    /// Ids of all fully constructed edges that are not deleted.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.initialized && !slot.deleted)
            .map(|(slot, _)| EdgeId::new(self.id, slot))
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    // ── Kind registry ────────────────────────────────────────────

    /// Register a root kind.
    pub fn register_kind(&mut self, kind: impl Into<NodeKind>) {
        self.kinds.entry(kind.into()).or_insert(None);
    }

    /// Register `kind` as a subkind of `parent`, so nodes of `kind` satisfy
    /// checks for `parent`.
    pub fn register_subkind(&mut self, kind: impl Into<NodeKind>, parent: impl Into<NodeKind>) {
        let parent = parent.into();
        self.kinds.entry(parent.clone()).or_insert(None);
        self.kinds.insert(kind.into(), Some(parent));
    }

    /// Whether `kind` is `ancestor` or (transitively) one of its subkinds.
    pub fn kind_is_a(&self, kind: &NodeKind, ancestor: &NodeKind) -> bool {
        let mut current = Some(kind);
        // Bounded walk: a cyclic registration cannot loop forever.
        for _ in 0..=self.kinds.len() {
            match current {
                Some(k) if k == ancestor => return true,
                Some(k) => current = self.kinds.get(k).and_then(Option::as_ref),
                None => return false,
            }
        }
        false
    }

    /// Whether the node exists and its kind satisfies `ancestor`.
    pub fn is_a(&self, node: NodeId, ancestor: &NodeKind) -> bool {
        self.node_slot(node)
            .map(|slot| self.kind_is_a(&slot.kind, ancestor))
            .unwrap_or(false)
    }

    // ── Collection hooks ─────────────────────────────────────────

    /// Register a veto callback on one of a node's adjacency collections.
    pub fn on_before_add<F>(&mut self, node: NodeId, direction: Direction, hook: F) -> Result<HookHandle>
    where
        F: Fn(&mut Graph, &EdgeId) -> Verdict + 'static,
    {
        Ok(self.collection_mut(node, direction)?.on_before_add(hook))
    }

    pub fn on_after_add<F>(&mut self, node: NodeId, direction: Direction, hook: F) -> Result<HookHandle>
    where
        F: Fn(&mut Graph, &EdgeId) + 'static,
    {
        Ok(self.collection_mut(node, direction)?.on_after_add(hook))
    }

    pub fn on_before_delete<F>(&mut self, node: NodeId, direction: Direction, hook: F) -> Result<HookHandle>
    where
        F: Fn(&mut Graph, &EdgeId) -> Verdict + 'static,
    {
        Ok(self.collection_mut(node, direction)?.on_before_delete(hook))
    }

    pub fn on_after_delete<F>(&mut self, node: NodeId, direction: Direction, hook: F) -> Result<HookHandle>
    where
        F: Fn(&mut Graph, &EdgeId) + 'static,
    {
        Ok(self.collection_mut(node, direction)?.on_after_delete(hook))
    }

    /// Unregister a collection callback. Returns `false` if already removed.
    pub fn remove_hook(&mut self, node: NodeId, direction: Direction, handle: HookHandle) -> Result<bool> {
        Ok(self.collection_mut(node, direction)?.off(handle))
    }

    fn collection_mut(&mut self, node: NodeId, direction: Direction) -> Result<&mut EdgeCollection> {
        Ok(self.node_slot_mut(node)?.collection_mut(direction))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .field("kinds", &self.kinds.len())
            .finish()
    }
}

/// Locates one adjacency collection of a node inside the graph.
///
/// Callers validate `node` before driving a mutation through it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeCollection {
    pub node: NodeId,
    pub direction: Direction,
}

impl NodeCollection {
    pub fn new(node: NodeId, direction: Direction) -> Self {
        Self { node, direction }
    }
}

impl Locate<EdgeId, Graph> for NodeCollection {
    fn locate<'a>(&self, graph: &'a mut Graph) -> &'a mut EdgeCollection {
        graph.nodes[self.node.slot].collection_mut(self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_registry() {
        let mut graph = Graph::new();
        graph.register_subkind("Manager", "Employee");
        graph.register_subkind("Employee", "Person");
        graph.register_kind("Document");

        let manager = NodeKind::from("Manager");
        assert!(graph.kind_is_a(&manager, &NodeKind::from("Person")));
        assert!(graph.kind_is_a(&manager, &manager));
        assert!(!graph.kind_is_a(&manager, &NodeKind::from("Document")));
        assert!(!graph.kind_is_a(&NodeKind::from("Person"), &manager));
    }

    #[test]
    fn test_unregistered_kind_matches_only_itself() {
        let graph = Graph::new();
        let kind = NodeKind::from("Loose");
        assert!(graph.kind_is_a(&kind, &kind));
        assert!(!graph.kind_is_a(&kind, &NodeKind::from("Other")));
    }

    #[test]
    fn test_cyclic_kinds_terminate() {
        let mut graph = Graph::new();
        graph.register_subkind("A", "B");
        graph.register_subkind("B", "A");
        assert!(!graph.kind_is_a(&NodeKind::from("A"), &NodeKind::from("C")));
    }

    #[test]
    fn test_foreign_ids_rejected() {
        let mut first = Graph::new();
        let second = Graph::new();
        let node = first.add_node("Thing");

        assert_eq!(second.node(node).unwrap_err(), GraphError::UnknownNode(node));
        assert!(!second.is_a(node, &NodeKind::from("Thing")));
    }

    #[test]
    fn test_counts_skip_deleted() {
        let mut graph = Graph::new();
        let a = graph.add_node("Thing");
        let b = graph.add_node("Thing");
        graph.connect(a, b, "link").unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);

        graph.delete_node(a).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }
}
