//! # In-Memory Graph
//!
//! [`Graph`] holds nodes and edges for one open model and implements [`GraphEditor`].
//!
//! ## Structure Rules
//!
//! - Node names are unique; a node's name never changes (see [`Graph::rename_node`]).
//! - Edges must reference existing nodes and ports.
//! - At most one edge per `(from_node, from_node_output, to_node, to_node_input)`.
//! - Removing a node removes every edge touching it.
//!
//! ## Example
//!
//! ```rust
//! use modelweave::graph::{Graph, GraphEditor};
//! use modelweave::registry::NodeTemplate;
//!
//! # let source = NodeTemplate::annotation();
//! # let sink = NodeTemplate::annotation();
//! let mut graph = Graph::new("pipeline");
//! graph.create_node("source", &source)?;
//! graph.create_node("sink", &sink)?;
//! assert_eq!(graph.node_count(), 2);
//! # Ok::<(), modelweave::error::GraphError>(())
//! ```

use super::edge::GraphEdge;
use super::editor::GraphEditor;
use super::node::GraphNode;
use crate::error::GraphError;
use crate::layout::{LayoutSnapshot, NodeGeometry};
use crate::registry::NodeTemplate;
use tracing::debug;

/// An in-memory graph of component instances.
#[derive(Clone, Debug, Default)]
pub struct Graph {
  /// The name of the graph.
  name: String,
  /// Nodes in creation order.
  nodes: Vec<GraphNode>,
  /// Edges in creation order.
  edges: Vec<GraphEdge>,
  /// Node name to position.
  positions: LayoutSnapshot,
  /// Counter backing editor-assigned ids.
  next_id: u64,
  /// Number of type catalog change notifications received.
  catalog_revision: u64,
}

impl Graph {
  /// Creates a new empty graph with the given name.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Self::default()
    }
  }

  /// Returns the name of the graph.
  #[must_use]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Sets the name of the graph.
  pub fn set_name(&mut self, name: &str) {
    self.name = name.to_string();
  }

  /// Number of nodes.
  #[must_use]
  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  /// Number of edges.
  #[must_use]
  pub fn edge_count(&self) -> usize {
    self.edges.len()
  }

  /// How many times the type catalog changed since the graph was created.
  #[must_use]
  pub fn catalog_revision(&self) -> u64 {
    self.catalog_revision
  }

  /// Applies a user rename: `name` stays the identity key, `new_name` becomes the alias.
  ///
  /// # Arguments
  ///
  /// * `name` - The node's identity name
  /// * `new_name` - The display name to show from now on
  ///
  /// # Errors
  ///
  /// Returns [`GraphError::NodeNotFound`] if there is no such node.
  pub fn rename_node(&mut self, name: &str, new_name: &str) -> Result<(), GraphError> {
    let node = self
      .nodes
      .iter_mut()
      .find(|n| n.name == name)
      .ok_or_else(|| GraphError::NodeNotFound(name.to_string()))?;
    node.rename(new_name);
    Ok(())
  }

  /// Mutable access to a node. The caller must not change `name`.
  pub fn node_mut(&mut self, name: &str) -> Option<&mut GraphNode> {
    self.nodes.iter_mut().find(|n| n.name == name)
  }

  /// Gets an edge by source and target node and port.
  ///
  /// # Arguments
  ///
  /// * `from_node` - The name of the source node
  /// * `from_port` - The name of the source output port
  /// * `to_node` - The name of the target node
  /// * `to_port` - The name of the target input port
  ///
  /// # Returns
  ///
  /// `Some(&GraphEdge)` if an edge matching the given endpoints exists, `None` otherwise.
  #[must_use]
  pub fn find_edge_by_nodes_and_ports(
    &self,
    from_node: &str,
    from_port: &str,
    to_node: &str,
    to_port: &str,
  ) -> Option<&GraphEdge> {
    self
      .edges
      .iter()
      .find(|e| e.connects(from_node, from_port, to_node, to_port))
  }

  /// Position of a node, if it has one.
  #[must_use]
  pub fn node_position(&self, name: &str) -> Option<&NodeGeometry> {
    self.positions.get(name)
  }

  /// Moves a node.
  ///
  /// # Errors
  ///
  /// Returns [`GraphError::NodeNotFound`] if there is no such node.
  pub fn set_node_position(&mut self, name: &str, geometry: NodeGeometry) -> Result<(), GraphError> {
    if self.get_node(name).is_none() {
      return Err(GraphError::NodeNotFound(name.to_string()));
    }
    self.positions.insert(name.to_string(), geometry);
    Ok(())
  }

  fn assign_id(&mut self, prefix: &str) -> String {
    self.next_id += 1;
    format!("{}-{}", prefix, self.next_id)
  }
}

impl GraphEditor for Graph {
  fn create_node(&mut self, name: &str, template: &NodeTemplate) -> Result<(), GraphError> {
    if self.get_node(name).is_some() {
      return Err(GraphError::NodeExists(name.to_string()));
    }
    let id = self.assign_id("node");
    self.nodes.push(GraphNode::from_template(id, name, template));
    Ok(())
  }

  fn get_node(&self, name: &str) -> Option<&GraphNode> {
    self.nodes.iter().find(|n| n.name == name)
  }

  fn update_node(&mut self, name: &str, node: GraphNode) -> Result<(), GraphError> {
    let slot = self
      .nodes
      .iter_mut()
      .find(|n| n.name == name)
      .ok_or_else(|| GraphError::NodeNotFound(name.to_string()))?;
    let id = std::mem::take(&mut slot.id);
    *slot = GraphNode {
      id,
      name: name.to_string(),
      ..node
    };
    Ok(())
  }

  fn remove_node(&mut self, name: &str) -> Result<(), GraphError> {
    let index = self
      .nodes
      .iter()
      .position(|n| n.name == name)
      .ok_or_else(|| GraphError::NodeNotFound(name.to_string()))?;
    self.nodes.remove(index);
    let before = self.edges.len();
    self.edges.retain(|e| !e.touches(name));
    self.positions.remove(name);
    debug!(
      node = %name,
      removed_edges = before - self.edges.len(),
      "removed node"
    );
    Ok(())
  }

  fn nodes(&self) -> Vec<&GraphNode> {
    self.nodes.iter().collect()
  }

  fn edges(&self) -> Vec<&GraphEdge> {
    self.edges.iter().collect()
  }

  fn add_edge(&mut self, mut edge: GraphEdge) -> Result<(), GraphError> {
    let source = self
      .get_node(&edge.from_node)
      .ok_or_else(|| GraphError::NodeNotFound(edge.from_node.clone()))?;
    if !source.has_output_port(&edge.from_node_output) {
      return Err(GraphError::PortNotFound {
        node: edge.from_node.clone(),
        port: edge.from_node_output.clone(),
        direction: "output",
      });
    }

    let target = self
      .get_node(&edge.to_node)
      .ok_or_else(|| GraphError::NodeNotFound(edge.to_node.clone()))?;
    if !target.has_input_port(&edge.to_node_input) {
      return Err(GraphError::PortNotFound {
        node: edge.to_node.clone(),
        port: edge.to_node_input.clone(),
        direction: "input",
      });
    }

    if self.edges.iter().any(|e| e.same_endpoints(&edge)) {
      return Err(GraphError::DuplicateEdge {
        from_node: edge.from_node,
        from_port: edge.from_node_output,
        to_node: edge.to_node,
        to_port: edge.to_node_input,
      });
    }

    edge.id = self.assign_id("edge");
    self.edges.push(edge);
    Ok(())
  }

  fn remove_edge(&mut self, id: &str) -> Result<(), GraphError> {
    let index = self
      .edges
      .iter()
      .position(|e| e.id == id)
      .ok_or_else(|| GraphError::EdgeNotFound(id.to_string()))?;
    self.edges.remove(index);
    Ok(())
  }

  fn current_layout_snapshot(&self) -> LayoutSnapshot {
    self.positions.clone()
  }

  fn apply_layout_snapshot(&mut self, snapshot: &LayoutSnapshot) {
    for (name, geometry) in snapshot {
      if self.nodes.iter().any(|n| &n.name == name) {
        self.positions.insert(name.clone(), *geometry);
      }
    }
  }

  fn notify_type_catalog_changed(&mut self) {
    self.catalog_revision += 1;
  }
}
