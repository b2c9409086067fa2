//! trellis-query: Composable traversal over the Trellis graph.
//!
//! A [`Query`] is an immutable pipeline of steps (follow outgoing edges,
//! follow incoming edges, filter). Executing it against one or more start
//! elements threads a frontier of path-annotated [`Traversal`] entries
//! through each step in order and returns the final frontier. Execution is
//! read-only and never fails: a step with no matches simply yields an empty
//! frontier.

pub mod element;
pub mod error;
pub mod fixture;
pub mod path;
pub mod query;
pub mod types;

pub use element::{Element, IntoStart};
pub use error::QueryError;
pub use path::{Path, PathStep, StepData, StepKind, Traversal};
pub use query::Query;
