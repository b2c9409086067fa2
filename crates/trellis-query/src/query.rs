//! Immutable, composable traversal pipelines.
//!
//! ```
//! # use trellis_graph::Graph;
//! # use trellis_query::{Element, Query};
//! let mut graph = Graph::new();
//! let a = graph.add_node("Folder");
//! let b = graph.add_node("Folder");
//! graph.connect(a, b, "child").unwrap();
//!
//! let children = Query::new().through_outgoing_edge("child");
//! assert_eq!(children.execute(&graph, a), vec![Element::Node(b)]);
//! ```

use std::fmt;
use std::rc::Rc;

use trellis_core::{Direction, Label, NodeId};
use trellis_graph::Graph;

use crate::element::{Element, IntoStart};
use crate::path::{StepData, StepKind, Traversal};

/// Filter predicate. Receives the graph read-only.
pub type Predicate = Rc<dyn Fn(&Graph, Element) -> bool>;

#[derive(Clone)]
enum Step {
    Through { direction: Direction, label: Label },
    Filter { name: Rc<str>, predicate: Predicate },
}

impl Step {
    fn apply(&self, graph: &Graph, frontier: Vec<Traversal>) -> Vec<Traversal> {
        match self {
            Self::Through { direction, label } => through(graph, &frontier, *direction, label),
            Self::Filter { name, predicate } => frontier
                .iter()
                .filter(|entry| predicate(graph, entry.element))
                .map(|entry| {
                    entry.advance(entry.element, StepKind::Filter, StepData::Predicate(name.clone()))
                })
                .collect(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Through { direction, label } => {
                write!(f, "{}({label})", StepKind::through(*direction))
            }
            Self::Filter { name, .. } => write!(f, "filter({name})"),
        }
    }
}

/// Follow every `direction` edge labelled `label` from each node entry.
///
/// Non-node entries and ids unknown to `graph` contribute nothing.
fn through(graph: &Graph, frontier: &[Traversal], direction: Direction, label: &Label) -> Vec<Traversal> {
    let mut next = Vec::new();
    for entry in frontier {
        let Some(node) = entry.element.as_node() else {
            continue;
        };
        let Ok(view) = graph.node(node) else {
            continue;
        };
        for edge in view.collection(direction) {
            let Ok(edge) = graph.edge(*edge) else {
                continue;
            };
            if edge.label() != label {
                continue;
            }
            next.push(entry.advance(
                Element::Node(edge.neighbor(direction)),
                StepKind::through(direction),
                StepData::Label(label.clone()),
            ));
        }
    }
    next
}

/// An immutable pipeline of traversal steps.
///
/// Every builder method returns a new query and leaves the receiver as it
/// was, so a base query can be shared and extended independently.
#[derive(Clone, Default)]
pub struct Query {
    steps: Vec<Step>,
}

impl Query {
    /// The empty pipeline: executing it returns the start elements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step to the destination of every outgoing `label` edge.
    pub fn through_outgoing_edge(&self, label: impl Into<Label>) -> Query {
        self.through_edge(Direction::Outgoing, label)
    }

    /// Step to the source of every incoming `label` edge.
    pub fn through_incoming_edge(&self, label: impl Into<Label>) -> Query {
        self.through_edge(Direction::Incoming, label)
    }

    /// Step to the neighbor across every `label` edge in `direction`.
    pub fn through_edge(&self, direction: Direction, label: impl Into<Label>) -> Query {
        self.with_step(Step::Through {
            direction,
            label: label.into(),
        })
    }

    /// Keep only entries whose element satisfies `predicate`. `name`
    /// identifies the filter in provenance paths.
    pub fn filter<F>(&self, name: &str, predicate: F) -> Query
    where
        F: Fn(&Graph, Element) -> bool + 'static,
    {
        self.with_step(Step::Filter {
            name: Rc::from(name),
            predicate: Rc::new(predicate),
        })
    }

    fn with_step(&self, step: Step) -> Query {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend(self.steps.iter().cloned());
        steps.push(step);
        Query { steps }
    }

    /// Run the pipeline and return the resulting elements.
    pub fn execute(&self, graph: &Graph, start: impl IntoStart) -> Vec<Element> {
        self.execute_full(graph, start)
            .into_iter()
            .map(|entry| entry.element)
            .collect()
    }

    /// Run the pipeline and keep only node results.
    pub fn execute_nodes(&self, graph: &Graph, start: impl IntoStart) -> Vec<NodeId> {
        self.execute_full(graph, start)
            .into_iter()
            .filter_map(|entry| entry.element.as_node())
            .collect()
    }

    /// Run the pipeline and return every result with its provenance path.
    ///
    /// Results form a bag: reaching a node through several edges yields
    /// several entries.
    pub fn execute_full(&self, graph: &Graph, start: impl IntoStart) -> Vec<Traversal> {
        let mut frontier: Vec<Traversal> = start.into_start().into_iter().map(Traversal::start).collect();
        for step in &self.steps {
            frontier = step.apply(graph, frontier);
            tracing::trace!(step = %step, frontier = frontier.len(), "Applied traversal step");
        }
        frontier
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("query()");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Query").field(&self.to_string()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// a -child-> b, a -child-> c, c -child-> d, b -parent-> a
    fn family() -> (Graph, [NodeId; 4]) {
        let mut graph = Graph::new();
        let a = graph.add_node("Person");
        let b = graph.add_node("Person");
        let c = graph.add_node("Person");
        let d = graph.add_node("Pet");
        graph.connect(a, b, "child").unwrap();
        graph.connect(a, c, "child").unwrap();
        graph.connect(c, d, "child").unwrap();
        graph.connect(b, a, "parent").unwrap();
        (graph, [a, b, c, d])
    }

    #[test]
    fn test_empty_query_returns_start() {
        let (graph, [a, b, ..]) = family();
        assert_eq!(Query::new().execute(&graph, [a, b]), vec![Element::Node(a), Element::Node(b)]);
    }

    #[test]
    fn test_outgoing_step() {
        let (graph, [a, b, c, _]) = family();
        let result = Query::new().through_outgoing_edge("child").execute_nodes(&graph, a);
        assert_eq!(result, vec![b, c]);
    }

    #[test]
    fn test_incoming_step_returns_neighbor() {
        let (graph, [a, b, c, d]) = family();
        let parents = Query::new().through_incoming_edge("child");

        assert_eq!(parents.execute_nodes(&graph, d), vec![c]);
        assert_eq!(parents.execute_nodes(&graph, b), vec![a]);
        assert!(parents.execute_nodes(&graph, a).is_empty());
    }

    #[test]
    fn test_two_hops() {
        let (graph, [a, _, _, d]) = family();
        let grandchildren = Query::new()
            .through_outgoing_edge("child")
            .through_outgoing_edge("child");
        assert_eq!(grandchildren.execute_nodes(&graph, a), vec![d]);
    }

    #[test]
    fn test_results_are_a_bag() {
        let (graph, [a, ..]) = family();
        let back_to_parent = Query::new()
            .through_outgoing_edge("child")
            .through_incoming_edge("child");
        assert_eq!(back_to_parent.execute_nodes(&graph, a), vec![a, a]);
    }

    #[test]
    fn test_label_must_match() {
        let (graph, [a, ..]) = family();
        assert!(Query::new().through_outgoing_edge("friend").execute(&graph, a).is_empty());
    }

    #[test]
    fn test_no_matches_anywhere_is_empty() {
        let (graph, [_, _, _, d]) = family();
        let query = Query::new()
            .through_outgoing_edge("child")
            .filter("anything", |_, _| true)
            .through_incoming_edge("parent");
        assert!(query.execute(&graph, d).is_empty());
        assert!(query.execute(&graph, Vec::<NodeId>::new()).is_empty());
    }

    #[test]
    fn test_filter() {
        let (graph, [a, _, c, _]) = family();
        let only_c = Query::new()
            .through_outgoing_edge("child")
            .filter("is_c", move |_, element| element == Element::Node(c));
        assert_eq!(only_c.execute(&graph, a), vec![Element::Node(c)]);
    }

    #[test]
    fn test_filter_sees_graph() {
        let (graph, [a, b, c, d]) = family();
        let with_children = Query::new().filter("has_children", |graph, element| {
            element
                .as_node()
                .and_then(|n| graph.node(n).ok())
                .is_some_and(|n| !n.outgoing().is_empty())
        });
        assert_eq!(with_children.execute_nodes(&graph, [a, b, c, d]), vec![a, b, c]);
    }

    #[test]
    fn test_edge_elements_do_not_traverse() {
        let (graph, [a, ..]) = family();
        let edge = *graph.node(a).unwrap().outgoing().iter().next().unwrap();

        let query = Query::new().through_outgoing_edge("child");
        assert!(query.execute(&graph, edge).is_empty());
        // Filters still see them.
        let kept = Query::new().filter("edges", |_, e| e.as_edge().is_some()).execute(&graph, edge);
        assert_eq!(kept, vec![Element::Edge(edge)]);
    }

    #[test]
    fn test_builders_do_not_mutate_receiver() {
        let (graph, [a, b, c, _]) = family();
        let base = Query::new();
        let children = base.through_outgoing_edge("child");
        let parents = base.through_outgoing_edge("parent");

        assert!(base.is_empty());
        assert_eq!(children.len(), 1);
        assert_eq!(children.execute_nodes(&graph, a), vec![b, c]);
        assert_eq!(parents.execute_nodes(&graph, b), vec![a]);
        assert_eq!(base.execute_nodes(&graph, a), vec![a]);
    }

    #[test]
    fn test_provenance() {
        let (graph, [a, _, c, d]) = family();
        let query = Query::new()
            .through_outgoing_edge("child")
            .filter("is_c", move |_, e| e == Element::Node(c))
            .through_outgoing_edge("child");

        let results = query.execute_full(&graph, a);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].element, Element::Node(d));

        let steps = results[0].path.steps();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].source, Element::Node(a));
        assert_eq!(steps[0].kind, StepKind::ThroughOutgoingEdge);
        assert_eq!(steps[0].data, StepData::Label("child".into()));
        assert_eq!(steps[1].source, Element::Node(c));
        assert_eq!(steps[1].kind, StepKind::Filter);
        assert_eq!(steps[1].data.to_string(), "is_c");
        assert_eq!(steps[2].source, Element::Node(c));
    }

    #[test]
    fn test_sibling_paths_equal_but_distinct() {
        let (graph, [a, ..]) = family();
        let results = Query::new()
            .through_outgoing_edge("child")
            .execute_full(&graph, a);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].path, results[1].path);
        assert!(!results[0].path.ptr_eq(&results[1].path));
    }

    #[test]
    fn test_display() {
        let query = Query::new()
            .through_outgoing_edge("child")
            .through_incoming_edge("owner")
            .filter("visible", |_, _| true);
        assert_eq!(query.to_string(), "out(child) -> in(owner) -> filter(visible)");
        assert_eq!(Query::new().to_string(), "query()");
    }
}
