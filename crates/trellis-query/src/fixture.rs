//! Build graphs from named JSON fixtures and render query results by name.

use std::collections::HashMap;
use std::io::Read;

use indexmap::IndexMap;
use trellis_core::{GraphConfig, NodeId, NodeKind};
use trellis_graph::Graph;

use crate::element::Element;
use crate::error::{QueryError, Result};
use crate::path::Traversal;
use crate::query::Query;
use crate::types::{GraphFixture, PathEntry, QueryReport, ResultEntry, StatsReport};

/// A graph plus the fixture names of its nodes.
pub struct LoadedGraph {
    graph: Graph,
    by_name: IndexMap<String, NodeId>,
    names: HashMap<NodeId, String>,
}

impl LoadedGraph {
    /// Materialise `fixture`: kinds first, then nodes, then edges in order.
    pub fn from_fixture(fixture: &GraphFixture, config: GraphConfig) -> Result<Self> {
        let mut graph = Graph::with_config(config);
        for kind in &fixture.kinds {
            match &kind.parent {
                Some(parent) => graph.register_subkind(kind.name.as_str(), parent.as_str()),
                None => graph.register_kind(kind.name.as_str()),
            }
        }

        let mut by_name = IndexMap::with_capacity(fixture.nodes.len());
        let mut names = HashMap::with_capacity(fixture.nodes.len());
        for spec in &fixture.nodes {
            if by_name.contains_key(&spec.name) {
                return Err(QueryError::DuplicateNode {
                    name: spec.name.clone(),
                });
            }
            let id = graph.add_node_with(spec.kind.as_str(), spec.properties.clone());
            by_name.insert(spec.name.clone(), id);
            names.insert(id, spec.name.clone());
        }

        let mut loaded = Self {
            graph,
            by_name,
            names,
        };
        for spec in &fixture.edges {
            let source = loaded.resolve(&spec.source)?;
            let destination = loaded.resolve(&spec.destination)?;
            loaded.graph.connect(source, destination, spec.label.as_str())?;
        }

        tracing::debug!(
            nodes = loaded.graph.node_count(),
            edges = loaded.graph.edge_count(),
            "Loaded graph fixture"
        );
        Ok(loaded)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn resolve(&self, name: &str) -> Result<NodeId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| QueryError::UnknownNode {
                name: name.to_string(),
            })
    }

    /// Fixture name for node elements; the id for everything else.
    pub fn name_of(&self, element: Element) -> String {
        match element {
            Element::Node(id) => self
                .names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
            Element::Edge(id) => id.to_string(),
        }
    }

    /// Delete the named node, cascading to its edges.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let id = self.resolve(name)?;
        self.graph.delete_node(id)?;
        Ok(())
    }

    pub fn stats(&self, deleted: usize) -> StatsReport {
        StatsReport {
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
            deleted,
        }
    }

    /// Render traversal results, including provenance when `full` is set.
    pub fn report(&self, query: &Query, results: &[Traversal], full: bool) -> QueryReport {
        let results = results
            .iter()
            .map(|entry| ResultEntry {
                element: self.name_of(entry.element),
                path: full.then(|| {
                    entry
                        .path
                        .steps()
                        .into_iter()
                        .map(|step| PathEntry {
                            from: self.name_of(step.source),
                            step: step.kind,
                            data: step.data.to_string(),
                        })
                        .collect()
                }),
            })
            .collect();
        QueryReport {
            query: query.to_string(),
            results,
        }
    }
}

/// Append one textual step (`out:<label>`, `in:<label>` or `kind:<Kind>`)
/// to `query`.
pub fn parse_step(query: &Query, step: &str) -> Result<Query> {
    let invalid = |reason: &str| QueryError::InvalidStep {
        step: step.to_string(),
        reason: reason.to_string(),
    };
    let (op, arg) = step
        .split_once(':')
        .ok_or_else(|| invalid("expected <op>:<argument>"))?;
    if arg.is_empty() {
        return Err(invalid("missing argument"));
    }

    match op {
        "out" => Ok(query.through_outgoing_edge(arg)),
        "in" => Ok(query.through_incoming_edge(arg)),
        "kind" => {
            let kind = NodeKind::from(arg);
            Ok(query.filter(step, move |graph, element| {
                element.as_node().is_some_and(|node| graph.is_a(node, &kind))
            }))
        }
        _ => Err(invalid("unknown operation, expected out, in or kind")),
    }
}

/// Build a pipeline from textual steps, in order.
pub fn build_query<S: AsRef<str>>(steps: &[S]) -> Result<Query> {
    steps
        .iter()
        .try_fold(Query::new(), |query, step| parse_step(&query, step.as_ref()))
}

/// Read a JSON fixture from `reader` to the end.
pub fn read_fixture<R: Read>(mut reader: R) -> Result<GraphFixture> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    Ok(serde_json::from_str(&input)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fixture() -> GraphFixture {
        serde_json::from_value(json!({
            "kinds": [
                {"name": "Animal"},
                {"name": "Dog", "parent": "Animal"}
            ],
            "nodes": [
                {"name": "alice", "kind": "Person", "properties": {"age": 40}},
                {"name": "bob", "kind": "Person"},
                {"name": "rex", "kind": "Dog"}
            ],
            "edges": [
                {"source": "alice", "destination": "bob", "label": "child"},
                {"source": "bob", "destination": "rex", "label": "pet"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_load_fixture() {
        let loaded = LoadedGraph::from_fixture(&fixture(), GraphConfig::default()).unwrap();
        assert_eq!(loaded.graph().node_count(), 3);
        assert_eq!(loaded.graph().edge_count(), 2);

        let alice = loaded.resolve("alice").unwrap();
        assert_eq!(loaded.graph().node(alice).unwrap().property("age"), Some(&json!(40)));
        assert_eq!(loaded.name_of(Element::Node(alice)), "alice");
    }

    #[test]
    fn test_duplicate_and_unknown_names() {
        let mut dup = fixture();
        dup.nodes.push(dup.nodes[0].clone());
        assert!(matches!(
            LoadedGraph::from_fixture(&dup, GraphConfig::default()),
            Err(QueryError::DuplicateNode { name }) if name == "alice"
        ));

        let mut dangling = fixture();
        dangling.edges[0].destination = "carol".to_string();
        assert!(matches!(
            LoadedGraph::from_fixture(&dangling, GraphConfig::default()),
            Err(QueryError::UnknownNode { name }) if name == "carol"
        ));
    }

    #[test]
    fn test_build_query() {
        let loaded = LoadedGraph::from_fixture(&fixture(), GraphConfig::default()).unwrap();
        let alice = loaded.resolve("alice").unwrap();

        let query = build_query(&["out:child", "out:pet", "kind:Animal"]).unwrap();
        assert_eq!(query.to_string(), "out(child) -> out(pet) -> filter(kind:Animal)");
        let results = query.execute(loaded.graph(), alice);
        assert_eq!(results, vec![Element::Node(loaded.resolve("rex").unwrap())]);

        let none = build_query(&["out:child", "kind:Animal"]).unwrap();
        assert!(none.execute(loaded.graph(), alice).is_empty());
    }

    #[test]
    fn test_read_fixture() {
        let input = br#"{"nodes": [{"name": "a", "kind": "Thing"}], "edges": []}"#;
        let fixture = read_fixture(&input[..]).unwrap();
        assert_eq!(fixture.nodes.len(), 1);
        assert!(fixture.kinds.is_empty());

        let err = read_fixture(&b"{\"nodes\": ["[..]).unwrap_err();
        assert!(matches!(err, QueryError::Serialization(_)));
        let err = read_fixture(&[0xff, 0xfe][..]).unwrap_err();
        assert!(matches!(err, QueryError::Io(_)));
    }

    #[test]
    fn test_invalid_steps() {
        for step in ["child", "out:", "sideways:child"] {
            assert!(
                matches!(build_query(&[step]), Err(QueryError::InvalidStep { .. })),
                "{step} should be rejected"
            );
        }
    }

    #[test]
    fn test_report_names_path() {
        let loaded = LoadedGraph::from_fixture(&fixture(), GraphConfig::default()).unwrap();
        let rex = loaded.resolve("rex").unwrap();
        let query = build_query(&["in:pet", "in:child"]).unwrap();

        let results = query.execute_full(loaded.graph(), rex);
        let report = loaded.report(&query, &results, true);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].element, "alice");

        let path = report.results[0].path.as_ref().unwrap();
        let hops: Vec<_> = path.iter().map(|p| (p.from.as_str(), p.data.as_str())).collect();
        assert_eq!(hops, vec![("rex", "pet"), ("bob", "child")]);

        let brief = loaded.report(&query, &results, false);
        assert!(brief.results[0].path.is_none());
    }

    #[test]
    fn test_delete_cascades() {
        let mut loaded = LoadedGraph::from_fixture(&fixture(), GraphConfig::default()).unwrap();
        loaded.delete("bob").unwrap();
        assert_eq!(loaded.stats(1), StatsReport { nodes: 2, edges: 0, deleted: 1 });
        assert!(loaded.delete("bob").is_err());
    }
}
