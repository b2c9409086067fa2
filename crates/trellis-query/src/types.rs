//! Fixture and report types for the `trellis-query` binary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path::StepKind;

/// A graph described by name, read from stdin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphFixture {
    /// Kind hierarchy. Kinds used by nodes need not be listed.
    #[serde(default)]
    pub kinds: Vec<KindSpec>,
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindSpec {
    pub name: String,
    /// Parent kind, if this kind is a specialisation.
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique name used to refer to the node elsewhere in the fixture.
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub source: String,
    pub destination: String,
    pub label: String,
}

/// Output of `trellis-query run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryReport {
    /// Display form of the executed pipeline.
    pub query: String,
    pub results: Vec<ResultEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEntry {
    /// Node name, or the edge id for edge elements.
    pub element: String,
    /// Present only when full results were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathEntry {
    pub from: String,
    pub step: StepKind,
    pub data: String,
}

/// Output of `trellis-query stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsReport {
    pub nodes: usize,
    pub edges: usize,
    /// Nodes deleted by this invocation.
    pub deleted: usize,
}
