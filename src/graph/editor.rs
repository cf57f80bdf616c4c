//! # Graph Editor Boundary
//!
//! The operations the loader, serializer and layout store need from whatever owns the
//! live graph. An interactive canvas implements this trait; [`Graph`](super::Graph) is the
//! in-memory implementation.

use super::edge::GraphEdge;
use super::node::GraphNode;
use crate::error::GraphError;
use crate::layout::LayoutSnapshot;
use crate::registry::NodeTemplate;

/// Live graph operations consumed by this crate.
pub trait GraphEditor {
  /// Creates a node called `name` from `template` and assigns it an id.
  ///
  /// # Arguments
  ///
  /// * `name` - The instance name, unique within the graph
  /// * `template` - The type template providing ports and default configuration
  ///
  /// # Returns
  ///
  /// `Ok(())` if the node was created.
  ///
  /// # Errors
  ///
  /// Returns [`GraphError::NodeExists`] if a node called `name` already exists.
  fn create_node(&mut self, name: &str, template: &NodeTemplate) -> Result<(), GraphError>;

  /// Looks up a node by name.
  ///
  /// # Returns
  ///
  /// `Some(&GraphNode)` if a node called `name` exists, `None` otherwise.
  fn get_node(&self, name: &str) -> Option<&GraphNode>;

  /// Replaces the node called `name`. The stored node keeps its id and name.
  ///
  /// # Errors
  ///
  /// Returns [`GraphError::NodeNotFound`] if there is no such node.
  fn update_node(&mut self, name: &str, node: GraphNode) -> Result<(), GraphError>;

  /// Removes a node and every edge touching it.
  ///
  /// # Arguments
  ///
  /// * `name` - The name of the node to remove
  ///
  /// # Errors
  ///
  /// Returns [`GraphError::NodeNotFound`] if there is no such node.
  fn remove_node(&mut self, name: &str) -> Result<(), GraphError>;

  /// All nodes, in creation order.
  fn nodes(&self) -> Vec<&GraphNode>;

  /// All edges, in creation order.
  fn edges(&self) -> Vec<&GraphEdge>;

  /// Adds an edge and assigns it an id.
  ///
  /// # Arguments
  ///
  /// * `edge` - The edge to add; its `id` is overwritten
  ///
  /// # Returns
  ///
  /// `Ok(())` if the edge was added.
  ///
  /// # Errors
  ///
  /// Fails if an endpoint node or port does not exist, or if an edge with the same
  /// endpoints already exists ([`GraphError::DuplicateEdge`]).
  fn add_edge(&mut self, edge: GraphEdge) -> Result<(), GraphError>;

  /// Removes the edge with the given id.
  ///
  /// # Errors
  ///
  /// Returns [`GraphError::EdgeNotFound`] if there is no such edge.
  fn remove_edge(&mut self, id: &str) -> Result<(), GraphError>;

  /// Current node positions.
  fn current_layout_snapshot(&self) -> LayoutSnapshot;

  /// Moves nodes to the positions in `snapshot`. Unknown node names are ignored.
  fn apply_layout_snapshot(&mut self, snapshot: &LayoutSnapshot);

  /// Called after a new node type was added to the registry.
  fn notify_type_catalog_changed(&mut self) {}
}
