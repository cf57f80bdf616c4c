//! Live, editable graph model.
//!
//! Nodes are component instances with typed ports, edges connect an output port to an
//! input port. The [`GraphEditor`] trait is the boundary the loader and serializer talk
//! to; [`Graph`] is the in-memory implementation used by the session and the tests.

pub mod edge;
pub mod editor;
#[allow(clippy::module_inception)]
pub mod graph;
pub mod node;

pub use edge::*;
pub use editor::*;
pub use graph::*;
pub use node::*;

#[cfg(test)]
mod graph_test;
