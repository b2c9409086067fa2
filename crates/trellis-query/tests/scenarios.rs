//! End-to-end traversal scenarios over a live, mutating graph.

use std::cell::Cell;
use std::rc::Rc;

use trellis_core::{Direction, NodeId};
use trellis_graph::{Graph, GraphError, Verdict};
use trellis_query::{Element, Query, StepKind};

fn children() -> Query {
    Query::new().through_outgoing_edge("child")
}

#[test]
fn test_query_reflects_edge_deletion() {
    let mut graph = Graph::new();
    let a = graph.add_node("Node");
    let b = graph.add_node("Node");
    let edge = graph.connect(a, b, "child").unwrap();

    let query = children();
    assert_eq!(query.execute(&graph, a), vec![Element::Node(b)]);

    graph.delete_edge(edge).unwrap();
    assert!(query.execute(&graph, a).is_empty());
}

#[test]
fn test_filter_selects_single_child() {
    let mut graph = Graph::new();
    let a = graph.add_node("Node");
    let b = graph.add_node("Node");
    let c = graph.add_node("Node");
    graph.connect(a, b, "child").unwrap();
    graph.connect(a, c, "child").unwrap();

    let query = children().filter("is_c", move |_, n| n == Element::Node(c));
    assert_eq!(query.execute(&graph, a), vec![Element::Node(c)]);
}

#[test]
fn test_node_deletion_empties_neighbor_collections() {
    let mut graph = Graph::new();
    let a = graph.add_node("Node");
    let b = graph.add_node("Node");
    let c = graph.add_node("Node");
    graph.connect(a, b, "child").unwrap();
    graph.connect(a, c, "child").unwrap();

    graph.delete_node(a).unwrap();

    assert_eq!(graph.node(b).unwrap().incoming().len(), 0);
    assert_eq!(graph.node(c).unwrap().incoming().len(), 0);
    assert!(children().execute(&graph, a).is_empty());
    assert!(Query::new().through_incoming_edge("child").execute(&graph, [b, c]).is_empty());
}

#[test]
fn test_redeleting_node_is_integrity_violation() {
    let mut graph = Graph::new();
    let a = graph.add_node("Node");
    let b = graph.add_node("Node");
    graph.connect(a, b, "child").unwrap();
    let cascades = Rc::new(Cell::new(0));
    let counter = cascades.clone();
    graph
        .on_after_delete(b, Direction::Incoming, move |_, _| counter.set(counter.get() + 1))
        .unwrap();

    graph.delete_node(a).unwrap();
    let err = graph.delete_node(a).unwrap_err();

    assert_eq!(err, GraphError::NodeDeleted(a));
    assert!(err.is_integrity_violation());
    assert_eq!(cascades.get(), 1);
    let view = graph.node(a).unwrap();
    assert!(view.outgoing().is_empty());
    assert!(view.incoming().is_empty());
}

#[test]
fn test_edge_membership_follows_lifecycle() {
    let mut graph = Graph::new();
    let a = graph.add_node("Node");
    let b = graph.add_node("Node");
    let edge = graph.connect(a, b, "child").unwrap();

    assert!(graph.node(a).unwrap().outgoing().contains(&edge));
    assert!(graph.node(b).unwrap().incoming().contains(&edge));

    graph.delete_edge(edge).unwrap();
    assert!(!graph.node(a).unwrap().outgoing().contains(&edge));
    assert!(!graph.node(b).unwrap().incoming().contains(&edge));
    assert!(graph.edge(edge).unwrap().is_deleted());
}

#[test]
fn test_rejected_edge_leaves_no_trace() {
    let mut graph = Graph::new();
    let a = graph.add_node("Node");
    let b = graph.add_node("Node");
    graph
        .on_before_add(b, Direction::Incoming, |_, _| Verdict::reject("b accepts no parents"))
        .unwrap();

    let err = graph.connect(a, b, "child").unwrap_err();
    assert_eq!(err.to_string(), "b accepts no parents");
    assert!(graph.node(a).unwrap().outgoing().is_empty());
    assert!(children().execute(&graph, a).is_empty());
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_incoming_traversal_walks_to_parents() {
    let mut graph = Graph::new();
    let root = graph.add_node("Node");
    let mid = graph.add_node("Node");
    let leaf = graph.add_node("Node");
    graph.connect(root, mid, "child").unwrap();
    graph.connect(mid, leaf, "child").unwrap();

    let ancestors = Query::new()
        .through_incoming_edge("child")
        .through_incoming_edge("child");
    let results = ancestors.execute_full(&graph, leaf);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].element, Element::Node(root));
    let kinds: Vec<_> = results[0].path.steps().iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![StepKind::ThroughIncomingEdge, StepKind::ThroughIncomingEdge]);
}

#[test]
fn test_self_loop_traversal_and_deletion() {
    let mut graph = Graph::new();
    let a = graph.add_node("Node");
    graph.connect(a, a, "child").unwrap();

    assert_eq!(children().execute_nodes(&graph, a), vec![a]);
    assert_eq!(
        Query::new().through_incoming_edge("child").execute_nodes(&graph, a),
        vec![a]
    );

    graph.delete_node(a).unwrap();
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_ids_from_other_graph_yield_nothing() {
    let mut graph = Graph::new();
    let a = graph.add_node("Node");
    let b = graph.add_node("Node");
    graph.connect(a, b, "child").unwrap();

    let mut other = Graph::new();
    let foreign: NodeId = other.add_node("Node");
    assert!(children().execute(&graph, foreign).is_empty());
    assert!(matches!(graph.node(foreign), Err(GraphError::UnknownNode(_))));
}
