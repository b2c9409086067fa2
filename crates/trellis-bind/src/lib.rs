//! trellis-bind: typed accessors layered over graph adjacency.
//!
//! An [`EdgeField`] treats the single outgoing edge with a given label as a
//! node-valued field; a [`NodeList`] treats every edge with a given label as
//! a list of nodes. Both are plain values built by a factory call that
//! installs validation hooks on the owning node's collection and returns a
//! handle holding the getter query and the hook handles.

pub mod error;
pub mod field;
pub mod list;
mod watch;

pub use error::{BindError, Result};
pub use field::{EdgeBinding, EdgeField};
pub use list::NodeList;
