//! Hook plumbing shared by fields and lists.

use std::rc::Rc;

use trellis_core::{Direction, EdgeId, Label, NodeId, NodeKind};
use trellis_graph::{Graph, HookHandle, Result};

/// Which edges of which node an accessor owns, and the property it reports
/// changes under.
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub owner: NodeId,
    pub direction: Direction,
    pub label: Label,
    pub kind: NodeKind,
    pub property: Rc<str>,
}

impl Binding {
    /// The node across `edge` when the edge carries this binding's label.
    pub fn far_side(&self, graph: &Graph, edge: EdgeId) -> Option<NodeId> {
        let edge = graph.edge(edge).ok()?;
        (*edge.label() == self.label).then(|| edge.neighbor(self.direction))
    }

    pub fn accepts(&self, graph: &Graph, node: NodeId) -> bool {
        graph.is_a(node, &self.kind)
    }

    /// Trigger a property change whenever a labelled edge is added or removed.
    pub fn notify_on_change(&self, graph: &mut Graph) -> Result<Vec<HookHandle>> {
        let added = self.clone();
        let removed = self.clone();
        Ok(vec![
            graph.on_after_add(self.owner, self.direction, move |graph, edge| {
                added.notify(graph, *edge)
            })?,
            graph.on_after_delete(self.owner, self.direction, move |graph, edge| {
                removed.notify(graph, *edge)
            })?,
        ])
    }

    fn notify(&self, graph: &mut Graph, edge: EdgeId) {
        if self.far_side(graph, edge).is_none() {
            return;
        }
        if let Err(e) = graph.trigger_property_change(self.owner, &self.property) {
            tracing::warn!(
                owner = %self.owner,
                property = %self.property,
                error = %e,
                "Property change notification failed"
            );
        }
    }

    /// Unregister `handles` from the owner's collection.
    pub fn detach(&self, graph: &mut Graph, handles: &[HookHandle]) -> Result<()> {
        for handle in handles {
            graph.remove_hook(self.owner, self.direction, *handle)?;
        }
        Ok(())
    }
}
