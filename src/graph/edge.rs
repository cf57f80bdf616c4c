//! # Graph Edges
//!
//! A [`GraphEdge`] connects `from_node.from_node_output` to `to_node.to_node_input`.
//! Two edges with the same four endpoint fields are the same connection; the graph keeps
//! at most one of them.

use crate::document::edge_name;
use serde_json::Value;

/// A live connection between two node ports.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
  /// Opaque id assigned by the editor (empty until added).
  pub id: String,
  /// Edge name.
  pub name: String,
  /// Source node name.
  pub from_node: String,
  /// Source output port.
  pub from_node_output: String,
  /// Target node name.
  pub to_node: String,
  /// Target input port.
  pub to_node_input: String,
  /// Whether the connection is decoupled (buffered) at runtime.
  pub decouple: Option<bool>,
  /// Render the edge as a smooth curve.
  pub smooth: bool,
  /// Edge annotations other than `decouple`.
  pub data: Option<Value>,
  /// Edge configuration, kept in structured form.
  pub configuration: Option<Value>,
}

impl GraphEdge {
  /// Creates a smooth edge named `fromNode_fromPort_toNode_toPort`.
  pub fn new(
    from_node: impl Into<String>,
    from_node_output: impl Into<String>,
    to_node: impl Into<String>,
    to_node_input: impl Into<String>,
  ) -> Self {
    let from_node = from_node.into();
    let from_node_output = from_node_output.into();
    let to_node = to_node.into();
    let to_node_input = to_node_input.into();
    Self {
      id: String::new(),
      name: edge_name(&from_node, &from_node_output, &to_node, &to_node_input),
      from_node,
      from_node_output,
      to_node,
      to_node_input,
      decouple: None,
      smooth: true,
      data: None,
      configuration: None,
    }
  }

  /// Overrides the edge name.
  #[must_use]
  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  /// Sets the decouple flag.
  #[must_use]
  pub fn with_decouple(mut self, decouple: bool) -> Self {
    self.decouple = Some(decouple);
    self
  }

  /// Whether `self` and `other` connect the same endpoints.
  #[must_use]
  pub fn same_endpoints(&self, other: &GraphEdge) -> bool {
    self.connects(
      &other.from_node,
      &other.from_node_output,
      &other.to_node,
      &other.to_node_input,
    )
  }

  /// Whether this edge connects the given endpoints.
  #[must_use]
  pub fn connects(&self, from_node: &str, from_port: &str, to_node: &str, to_port: &str) -> bool {
    self.from_node == from_node
      && self.from_node_output == from_port
      && self.to_node == to_node
      && self.to_node_input == to_port
  }

  /// Whether either end of the edge is on node `name`.
  #[must_use]
  pub fn touches(&self, name: &str) -> bool {
    self.from_node == name || self.to_node == name
  }
}
