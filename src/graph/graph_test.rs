//! # Graph Test Suite
//!
//! Covers node identity and renames, edge validation and de-duplication, cascade
//! removal and node positions for the in-memory [`Graph`].

use crate::document::{Direction, InterfaceDescriptor, ModelRef, ModelVersion};
use crate::error::GraphError;
use crate::graph::{ExportMode, Graph, GraphEdge, GraphEditor, PortDirection};
use crate::layout::{LayoutSnapshot, NodeGeometry};
use crate::registry::NodeTemplate;
use serde_json::json;

// ============================================================================
// Fixtures
// ============================================================================

fn template(name: &str, inputs: &[&str], outputs: &[&str]) -> NodeTemplate {
  let mut version = ModelVersion::new("v1");
  for (ports, direction) in [(inputs, Direction::Incoming), (outputs, Direction::Outgoing)] {
    for port in ports {
      version.interfaces.push(InterfaceDescriptor {
        name: port.to_string(),
        kind: "float".to_string(),
        direction,
        domain: "dom".to_string(),
        ..InterfaceDescriptor::default()
      });
    }
  }
  version.default_configuration = Some(json!({"gain": 1}));
  NodeTemplate::from_version(ModelRef::new("dom", name, "v1"), &version)
}

fn two_node_graph() -> Graph {
  let mut graph = Graph::new("test");
  graph.create_node("A", &template("T", &[], &["o1"])).unwrap();
  graph.create_node("B", &template("Sink", &["i1"], &[])).unwrap();
  graph
}

// ============================================================================
// Node Management
// ============================================================================

#[test]
fn test_create_node_assigns_id_and_copies_template() {
  let graph = two_node_graph();
  let a = graph.get_node("A").unwrap();
  assert!(!a.id.is_empty());
  assert_ne!(a.id, graph.get_node("B").unwrap().id);
  assert_eq!(a.type_key, "dom::T::v1");
  assert!(a.has_output_port("o1"));
  assert!(!a.has_input_port("o1"));
  assert_eq!(a.configuration.data, Some(json!({"gain": 1})));
  assert_eq!(
    a.port(PortDirection::Output, "o1").unwrap().interface,
    ExportMode::NotExported
  );
}

#[test]
fn test_create_node_rejects_duplicate_name() {
  let mut graph = two_node_graph();
  assert_eq!(
    graph.create_node("A", &NodeTemplate::annotation()),
    Err(GraphError::NodeExists("A".to_string()))
  );
  assert_eq!(graph.node_count(), 2);
}

#[test]
fn test_rename_sets_alias_and_keeps_name() {
  let mut graph = two_node_graph();
  graph.rename_node("A", "B").unwrap();
  let a = graph.get_node("A").unwrap();
  assert_eq!(a.name, "A");
  assert_eq!(a.alias.as_deref(), Some("B"));
  assert_eq!(a.display_name(), "B");
  assert!(graph.get_node("B").unwrap().alias.is_none());

  graph.rename_node("A", "A").unwrap();
  assert!(graph.get_node("A").unwrap().alias.is_none());
  assert_eq!(
    graph.rename_node("Z", "Y"),
    Err(GraphError::NodeNotFound("Z".to_string()))
  );
}

#[test]
fn test_update_node_keeps_id_and_name() {
  let mut graph = two_node_graph();
  let original = graph.get_node("A").unwrap().clone();
  let mut edited = original.clone();
  edited.id = "other".to_string();
  edited.name = "renamed".to_string();
  edited.alias = Some("Alias".to_string());
  graph.update_node("A", edited).unwrap();

  let stored = graph.get_node("A").unwrap();
  assert_eq!(stored.id, original.id);
  assert_eq!(stored.name, "A");
  assert_eq!(stored.alias.as_deref(), Some("Alias"));
  assert!(graph.get_node("renamed").is_none());
}

#[test]
fn test_remove_node_cascades_edges_and_position() {
  let mut graph = two_node_graph();
  graph.add_edge(GraphEdge::new("A", "o1", "B", "i1")).unwrap();
  graph.set_node_position("B", NodeGeometry::at(1.0, 1.0)).unwrap();
  graph.remove_node("B").unwrap();
  assert_eq!(graph.node_count(), 1);
  assert_eq!(graph.edge_count(), 0);
  assert!(graph.node_position("B").is_none());
  assert!(graph.remove_node("B").is_err());
}

// ============================================================================
// Edge Management
// ============================================================================

#[test]
fn test_add_edge_twice_keeps_one() {
  let mut graph = two_node_graph();
  graph.add_edge(GraphEdge::new("A", "o1", "B", "i1")).unwrap();
  let second = graph.add_edge(GraphEdge::new("A", "o1", "B", "i1").with_name("other"));
  assert!(matches!(second, Err(GraphError::DuplicateEdge { .. })));
  assert_eq!(graph.edge_count(), 1);

  let edge = graph.find_edge_by_nodes_and_ports("A", "o1", "B", "i1").unwrap();
  assert_eq!(edge.name, "A_o1_B_i1");
  assert!(edge.smooth);
  assert!(edge.id.starts_with("edge-"));
}

#[test]
fn test_add_edge_validates_nodes_and_ports() {
  let mut graph = two_node_graph();
  assert_eq!(
    graph.add_edge(GraphEdge::new("X", "o1", "B", "i1")),
    Err(GraphError::NodeNotFound("X".to_string()))
  );
  assert!(matches!(
    graph.add_edge(GraphEdge::new("A", "nope", "B", "i1")),
    Err(GraphError::PortNotFound { direction: "output", .. })
  ));
  assert!(matches!(
    graph.add_edge(GraphEdge::new("B", "i1", "A", "o1")),
    Err(GraphError::PortNotFound { .. })
  ));
  assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_remove_edge_by_id() {
  let mut graph = two_node_graph();
  graph.add_edge(GraphEdge::new("A", "o1", "B", "i1")).unwrap();
  let id = graph.edges()[0].id.clone();
  graph.remove_edge(&id).unwrap();
  assert_eq!(graph.edge_count(), 0);
  assert_eq!(
    graph.remove_edge(&id),
    Err(GraphError::EdgeNotFound(id.clone()))
  );
}

// ============================================================================
// Layout and Catalog
// ============================================================================

#[test]
fn test_apply_layout_ignores_unknown_nodes() {
  let mut graph = two_node_graph();
  let mut snapshot = LayoutSnapshot::new();
  snapshot.insert("A".to_string(), NodeGeometry::at(5.0, 6.0));
  snapshot.insert("ghost".to_string(), NodeGeometry::at(0.0, 0.0));
  graph.apply_layout_snapshot(&snapshot);

  let current = graph.current_layout_snapshot();
  assert_eq!(current.len(), 1);
  assert_eq!(current.get("A"), Some(&NodeGeometry::at(5.0, 6.0)));
  assert!(graph.set_node_position("ghost", NodeGeometry::default()).is_err());
}

#[test]
fn test_catalog_notifications_are_counted() {
  let mut graph = Graph::new("g");
  assert_eq!(graph.catalog_revision(), 0);
  graph.notify_type_catalog_changed();
  graph.notify_type_catalog_changed();
  assert_eq!(graph.catalog_revision(), 2);
}
