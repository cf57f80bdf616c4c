use modelweave::config::SessionConfig;
use modelweave::document::{
  ComponentModelDocument, Direction, EdgeRef, Endpoint, InterfaceDescriptor, ModelRef,
  ModelVersion, NodeRef,
};
use modelweave::error::SessionError;
use modelweave::graph::{Graph, GraphEditor, PortDirection};
use modelweave::layout::NodeGeometry;
use modelweave::session::ModelSession;
use modelweave::store::{FileModelStore, MemoryModelStore, ModelStore};
use modelweave::submodel::SubDocumentForm;
use serde_json::json;
use std::path::Path;

// Test fixtures

fn port(name: &str, direction: Direction) -> InterfaceDescriptor {
  InterfaceDescriptor {
    name: name.to_string(),
    kind: "float".to_string(),
    direction,
    domain: "dsp".to_string(),
    ..InterfaceDescriptor::default()
  }
}

fn atomic(name: &str, interfaces: Vec<InterfaceDescriptor>) -> ComponentModelDocument {
  let mut document = ComponentModelDocument::new("dsp", name);
  document.kind = Some("atomic".to_string());
  let mut version = ModelVersion::new("1");
  version.interfaces = interfaces;
  version.default_configuration = Some(json!({"enabled": true}));
  document.versions.push(version);
  document
}

fn chain() -> ComponentModelDocument {
  let mut document = ComponentModelDocument::new("dsp", "Chain");
  document.kind = Some("composite".to_string());
  let mut version = ModelVersion::new("1");
  version.interfaces.push(InterfaceDescriptor {
    link_to_node: Some("src".to_string()),
    link_to_interface: Some("out".to_string()),
    ..port("signal", Direction::Outgoing)
  });
  for (name, model) in [("src", "Source"), ("lp", "Filter"), ("extra", "Unknown")] {
    version.components.nodes.push(NodeRef {
      name: name.to_string(),
      model: ModelRef::new("dsp", model, "1"),
      ..NodeRef::default()
    });
  }
  version.components.edges.push(EdgeRef {
    name: None,
    from: Endpoint::new("src", "out"),
    to: Endpoint::new("lp", "in"),
    data: Some(json!({"decouple": true})),
  });
  version.data = Some(json!({
    "gui": {"defaultLayout": "main", "layouts": {"main": {"src": {"x": 0.0, "y": 0.0}}}}
  }));
  document.versions.push(version);
  document
}

fn seeded_store(root: &Path) -> FileModelStore {
  let mut store = FileModelStore::new(root);
  store
    .store_model(&atomic("Source", vec![port("out", Direction::Outgoing)]))
    .unwrap();
  store
    .store_model(&atomic(
      "Filter",
      vec![port("in", Direction::Incoming), port("out", Direction::Outgoing)],
    ))
    .unwrap();
  store.store_model(&chain()).unwrap();
  store
}

#[test]
fn test_open_edit_save_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let config = SessionConfig::default().with_store_root(dir.path());
  let store = seeded_store(dir.path());

  let mut session = ModelSession::new(config.clone(), store, Graph::new("chain"));
  let report = session.open("dsp", "Chain", "1").unwrap();
  assert_eq!(report.created_nodes, vec!["src", "lp"]);
  assert_eq!(report.skipped_nodes.len(), 1);
  assert_eq!(report.skipped_nodes[0].name, "extra");
  assert!(report.layout_applied);
  assert_eq!(session.editor().edge_count(), 1);
  assert_eq!(session.editor().edges()[0].decouple, Some(true));

  // Edit: rename, move, export a port, add a layout.
  session.rename_node("lp", "Low pass").unwrap();
  session
    .editor_mut()
    .set_node_position("lp", NodeGeometry::at(120.0, 40.0))
    .unwrap();
  session
    .editor_mut()
    .node_mut("lp")
    .unwrap()
    .port_mut(PortDirection::Output, "out")
    .unwrap()
    .export(Some("filtered".to_string()));
  session.add_layout("compact");
  assert!(session.save());

  let reopened_store = FileModelStore::new(dir.path());
  let mut reopened = ModelSession::new(config, reopened_store, Graph::new("again"));
  reopened.open("dsp", "Chain", "1").unwrap();
  let graph = reopened.editor();
  assert_eq!(graph.node_count(), 2);
  let lp = graph.get_node("lp").unwrap();
  assert_eq!(lp.alias.as_deref(), Some("Low pass"));
  assert_eq!(
    lp.port(PortDirection::Output, "out")
      .unwrap()
      .interface_export_name
      .as_deref(),
    Some("filtered")
  );
  assert_eq!(lp.configuration.data, Some(json!({"enabled": true})));
  assert_eq!(graph.node_position("lp"), Some(&NodeGeometry::at(120.0, 40.0)));
  assert_eq!(reopened.layouts().default_layout(), Some("main"));
  assert!(reopened.layouts().layout("compact").is_some());

  let saved = reopened.document().active_version().unwrap();
  let names: Vec<&str> = saved.interfaces.iter().map(|d| d.name.as_str()).collect();
  assert_eq!(names, vec!["signal", "filtered"]);
  assert_eq!(saved.components.edges.len(), 1);
}

#[test]
fn test_open_missing_version_fails() {
  let dir = tempfile::tempdir().unwrap();
  let store = seeded_store(dir.path());
  let mut session = ModelSession::new(SessionConfig::default(), store, Graph::new("g"));
  assert!(matches!(
    session.open("dsp", "Chain", "7"),
    Err(SessionError::MissingVersion { .. })
  ));
  assert!(matches!(
    session.open("dsp", "Nope", "1"),
    Err(SessionError::Store(_))
  ));
}

#[test]
fn test_register_type_reports_and_notifies() {
  let store = MemoryModelStore::new().with_model(atomic("Source", vec![port("out", Direction::Outgoing)]));
  let mut session = ModelSession::new(SessionConfig::default(), store, Graph::new("g"));

  assert!(session.register_type("dsp", "Source", "1"));
  assert!(session.register_type("dsp", "Source", "1"));
  assert!(!session.register_type("dsp", "Missing", "1"));
  assert_eq!(session.editor().catalog_revision(), 1);
  assert_eq!(
    session.template_catalog(),
    vec!["dsp::Source::1".to_string(), "gui::description::1.0".to_string()]
  );
}

#[test]
fn test_sessions_share_registry() {
  let store = MemoryModelStore::new().with_model(atomic("Source", vec![port("out", Direction::Outgoing)]));
  let mut first = ModelSession::new(SessionConfig::default(), store, Graph::new("a"));
  assert!(first.register_type("dsp", "Source", "1"));

  let second = ModelSession::with_registry(
    SessionConfig::default(),
    first.registry().clone(),
    MemoryModelStore::new(),
    Graph::new("b"),
  );
  assert!(second.template_catalog().contains(&"dsp::Source::1".to_string()));
}

#[test]
fn test_layout_operations() {
  let dir = tempfile::tempdir().unwrap();
  let store = seeded_store(dir.path());
  let mut session = ModelSession::new(SessionConfig::default(), store, Graph::new("g"));
  session.open("dsp", "Chain", "1").unwrap();

  session
    .editor_mut()
    .set_node_position("src", NodeGeometry::at(9.0, 9.0))
    .unwrap();
  assert!(!session.select_layout("wide"));
  assert_eq!(
    session.layouts().layout("main").and_then(|l| l.get("src")),
    Some(&NodeGeometry::at(9.0, 9.0))
  );
  assert!(session.select_layout("main"));
  session.remove_layout("main").unwrap();
  assert_eq!(session.layouts().default_layout(), None);
  assert!(matches!(
    session.remove_layout("main"),
    Err(SessionError::UnknownLayout(_))
  ));
}

#[test]
fn test_clear_derived_interfaces_and_structured_save() {
  let store = MemoryModelStore::new()
    .with_model(atomic("Source", vec![port("out", Direction::Outgoing)]))
    .with_model(atomic(
      "Filter",
      vec![port("in", Direction::Incoming), port("out", Direction::Outgoing)],
    ))
    .with_model(chain());
  let config = SessionConfig::default().with_sub_document_form(SubDocumentForm::Structured);
  let mut session = ModelSession::new(config, store, Graph::new("g"));
  session.open("dsp", "Chain", "1").unwrap();

  session
    .editor_mut()
    .node_mut("src")
    .unwrap()
    .port_mut(PortDirection::Output, "out")
    .unwrap()
    .unexport();
  assert_eq!(session.clear_derived_interfaces(), 1);
  let document = session.try_save().unwrap();
  let version = document.active_version().unwrap();
  assert!(version.interfaces.is_empty());
  assert_eq!(
    version.components.configuration.nodes[0].configuration.data,
    Some(json!({"enabled": true}))
  );

  let stored = session.store().fetch_model("dsp", "Chain", "1", true).unwrap();
  assert_eq!(stored.active_version().unwrap(), version);
}

#[test]
fn test_export_mermaid_writes_diagram() {
  let dir = tempfile::tempdir().unwrap();
  let store = seeded_store(dir.path());
  let mut session = ModelSession::new(SessionConfig::default(), store, Graph::new("g"));
  session.open("dsp", "Chain", "1").unwrap();
  let path = dir.path().join("chain.mmd");
  session.export_mermaid(&path).unwrap();
  let text = std::fs::read_to_string(&path).unwrap();
  assert!(text.starts_with("%% model: dsp::Chain::1"));
  assert!(text.contains("src_out_out -.-> lp_in_in"));
}

#[test]
fn test_from_config_uses_store_root() {
  let dir = tempfile::tempdir().unwrap();
  seeded_store(dir.path());
  let config = SessionConfig::default().with_store_root(dir.path());
  let mut session = ModelSession::from_config(config, Graph::new("g"));
  assert_eq!(session.store().root(), dir.path());
  assert!(session.open("dsp", "Chain", "1").is_ok());
}
