use crate::document::{ComponentModelDocument, Direction, Endpoint};
use crate::graph::{Graph, GraphEditor, PortDirection};
use crate::layout::{LayoutStore, NodeGeometry};
use crate::loader::ModelLoader;
use crate::registry::{SharedTypeRegistry, TypeRegistry};
use crate::serializer::{INITIAL_VERSION, ModelSerializer, SerializeOptions};
use crate::store::MemoryModelStore;
use crate::submodel::SubDocumentForm;
use crate::test_support::{chain_document, source_sink_store};
use serde_json::{Value, json};

// ============================================================================
// Fixtures
// ============================================================================

struct Loaded {
  registry: SharedTypeRegistry,
  store: MemoryModelStore,
  base: ComponentModelDocument,
  graph: Graph,
  layouts: LayoutStore,
}

impl Loaded {
  fn chain() -> Self {
    Self::from_document(chain_document())
  }

  fn from_document(mut base: ComponentModelDocument) -> Self {
    let registry = TypeRegistry::new().into_shared();
    let store = source_sink_store();
    let mut graph = Graph::new("test");
    let mut layouts = LayoutStore::new();
    ModelLoader::new(&registry, &store).load(&mut base, &mut graph, &mut layouts);
    Self {
      registry,
      store,
      base,
      graph,
      layouts,
    }
  }

  fn serialize(&mut self, options: SerializeOptions) -> ComponentModelDocument {
    ModelSerializer::new(options).serialize(&self.base, &self.graph, &mut self.layouts)
  }

  fn reload(&self, document: &ComponentModelDocument) -> Graph {
    let mut document = document.clone();
    let mut graph = Graph::new("reloaded");
    let mut layouts = LayoutStore::new();
    ModelLoader::new(&self.registry, &self.store).load(&mut document, &mut graph, &mut layouts);
    graph
  }
}

// ============================================================================
// Round Trip
// ============================================================================

#[test]
fn test_serialize_chain_lists_export_once() {
  let mut loaded = Loaded::chain();
  let document = loaded.serialize(SerializeOptions::default());
  let version = document.active_version().unwrap();

  assert_eq!(version.interfaces.len(), 1);
  let iface = &version.interfaces[0];
  assert_eq!(iface.name, "ifaceA");
  assert_eq!(iface.link_to_node.as_deref(), Some("A"));
  assert_eq!(iface.link_to_interface.as_deref(), Some("out1"));

  assert_eq!(version.components.edges.len(), 1);
  let edge = &version.components.edges[0];
  assert_eq!(edge.from, Endpoint::new("A", "out1"));
  assert_eq!(edge.to, Endpoint::new("B", "in1"));
  assert_eq!(edge.name.as_deref(), Some("A_out1_B_in1"));
  assert_eq!(edge.data, None);

  let nodes: Vec<&str> = version.components.nodes.iter().map(|n| n.name.as_str()).collect();
  assert_eq!(nodes, vec!["A", "B"]);
  assert_eq!(version.components.nodes[0].model.type_key(), "dom::T::v1");
  let configs = &version.components.configuration.nodes;
  assert_eq!(configs.len(), 2);
  assert_eq!(configs[0].domain.as_deref(), Some("dom"));
}

#[test]
fn test_repeated_save_is_stable() {
  let mut loaded = Loaded::chain();
  let first = loaded.serialize(SerializeOptions::default());
  loaded.base = first.clone();
  let second = loaded.serialize(SerializeOptions::default());
  assert_eq!(first, second);
}

#[test]
fn test_reload_reproduces_graph() {
  let mut loaded = Loaded::chain();
  loaded
    .graph
    .node_mut("A")
    .unwrap()
    .configuration
    .data = Some(json!({"gain": 2}));
  let document = loaded.serialize(SerializeOptions::default());
  let graph = loaded.reload(&document);

  assert_eq!(graph.node_count(), 2);
  assert_eq!(graph.edge_count(), 1);
  let a = graph.get_node("A").unwrap();
  assert_eq!(
    a.port(PortDirection::Output, "out1")
      .unwrap()
      .interface_export_name
      .as_deref(),
    Some("ifaceA")
  );
  assert_eq!(a.configuration.data, Some(json!({"gain": 2})));
}

#[test]
fn test_rename_is_written_as_alias() {
  let mut loaded = Loaded::chain();
  loaded.graph.rename_node("A", "Source").unwrap();
  loaded
    .graph
    .node_mut("A")
    .unwrap()
    .port_mut(PortDirection::Output, "out1")
    .unwrap()
    .alias = Some("Signal".to_string());

  let document = loaded.serialize(SerializeOptions::default());
  let version = document.active_version().unwrap();
  let a = &version.components.nodes[0];
  assert_eq!(a.name, "A");
  assert_eq!(a.alias.as_deref(), Some("Source"));
  assert_eq!(a.interface_aliases.get("out1").map(String::as_str), Some("Signal"));
  assert_eq!(version.components.edges[0].from.name, "A");
  assert_eq!(version.interfaces[0].link_to_node.as_deref(), Some("A"));
}

// ============================================================================
// Interfaces
// ============================================================================

#[test]
fn test_stale_descriptors_are_kept_by_default() {
  let mut loaded = Loaded::chain();
  loaded
    .graph
    .node_mut("A")
    .unwrap()
    .port_mut(PortDirection::Output, "out1")
    .unwrap()
    .unexport();
  loaded
    .graph
    .node_mut("B")
    .unwrap()
    .port_mut(PortDirection::Input, "in1")
    .unwrap()
    .export(None);

  let document = loaded.serialize(SerializeOptions::default());
  let names: Vec<&str> = document
    .active_version()
    .unwrap()
    .interfaces
    .iter()
    .map(|d| d.name.as_str())
    .collect();
  assert_eq!(names, vec!["ifaceA", "B:in1"]);
}

#[test]
fn test_clear_option_drops_stale_descriptors() {
  let mut loaded = Loaded::chain();
  loaded
    .graph
    .node_mut("A")
    .unwrap()
    .port_mut(PortDirection::Output, "out1")
    .unwrap()
    .unexport();
  loaded
    .graph
    .node_mut("B")
    .unwrap()
    .port_mut(PortDirection::Input, "in1")
    .unwrap()
    .export(Some("level".to_string()));

  let options = SerializeOptions::default().with_clear_derived_interfaces(true);
  let document = loaded.serialize(options);
  let interfaces = &document.active_version().unwrap().interfaces;
  assert_eq!(interfaces.len(), 1);
  assert_eq!(interfaces[0].name, "level");
  assert_eq!(interfaces[0].direction, Direction::Incoming);
}

// ============================================================================
// Sub-documents, Edges and Layout
// ============================================================================

#[test]
fn test_configuration_form() {
  let mut loaded = Loaded::chain();
  loaded.graph.node_mut("A").unwrap().configuration.data = Some(json!({"gain": 2}));

  let embedded = loaded.serialize(SerializeOptions::default());
  let config = &embedded.active_version().unwrap().components.configuration.nodes[0];
  assert_eq!(
    config.configuration.data,
    Some(Value::String("{\"gain\":2}".to_string()))
  );

  let options = SerializeOptions::default().with_sub_document_form(SubDocumentForm::Structured);
  let structured = loaded.serialize(options);
  let config = &structured.active_version().unwrap().components.configuration.nodes[0];
  assert_eq!(config.configuration.data, Some(json!({"gain": 2})));
}

#[test]
fn test_edge_decouple_and_configuration_are_written() {
  let mut loaded = Loaded::chain();
  let id = loaded.graph.edges()[0].id.clone();
  let mut edge = loaded.graph.edges()[0].clone();
  loaded.graph.remove_edge(&id).unwrap();
  edge.decouple = Some(true);
  edge.data = Some(json!({"color": "red"}));
  edge.configuration = Some(json!({"buffer": 4}));
  loaded.graph.add_edge(edge).unwrap();

  let document = loaded.serialize(SerializeOptions::default());
  let version = document.active_version().unwrap();
  assert_eq!(
    version.components.edges[0].data,
    Some(json!({"color": "red", "decouple": true}))
  );
  let edge_config = &version.components.configuration.edges[0];
  assert_eq!(edge_config.name, "A_out1_B_in1");
  assert_eq!(edge_config.data, Some(Value::String("{\"buffer\":4}".to_string())));
}

#[test]
fn test_layout_is_flushed_into_gui() {
  let mut base = chain_document();
  base.active_version_mut().unwrap().data = Some(json!({"owner": "me"}));
  let mut loaded = Loaded::from_document(base);
  loaded
    .graph
    .set_node_position("A", NodeGeometry::at(3.0, 4.0))
    .unwrap();

  let document = loaded.serialize(SerializeOptions::default());
  let data = document.active_version().unwrap().data.clone().unwrap();
  assert_eq!(data["owner"], json!("me"));
  assert_eq!(data["gui"]["defaultLayout"], json!("default"));
  assert_eq!(data["gui"]["layouts"]["default"]["A"], json!({"x": 3.0, "y": 4.0}));
}

#[test]
fn test_base_without_version_gets_initial_version() {
  let mut graph = Graph::new("fresh");
  graph
    .create_node("note", &crate::registry::NodeTemplate::annotation())
    .unwrap();
  let mut layouts = LayoutStore::new();
  let base = ComponentModelDocument::new("dom", "Fresh");

  let document = ModelSerializer::default().serialize(&base, &graph, &mut layouts);
  assert_eq!(document.versions.len(), 1);
  let version = document.active_version().unwrap();
  assert_eq!(version.version, INITIAL_VERSION);
  assert_eq!(version.components.nodes[0].model.type_key(), "gui::description::1.0");
}
