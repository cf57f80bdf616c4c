//! # Model Loader
//!
//! Populates a live graph from a [`ComponentModelDocument`].
//!
//! A load runs these passes over the document's active version, in order:
//!
//! 1. Detach the `gui` sub-tree from `data` into the [`LayoutStore`].
//! 2. Instantiate every node not already in the graph, registering its type on demand.
//! 3. Wire edges. Edges that duplicate an existing connection are silently dropped.
//! 4. Merge per-node configuration overrides onto the nodes.
//! 5. Apply the current layout snapshot, if the store has one.
//!
//! Every failure is per item. A node whose type cannot be resolved is skipped and the
//! rest of the document still loads; the [`LoadReport`] says what was skipped and why.

use crate::document::{ComponentModelDocument, EdgeRef, ModelVersion, NodeRef};
use crate::error::GraphError;
use crate::graph::{GraphEdge, GraphEditor, PortDirection};
use crate::interface::apply_exports_from_model;
use crate::layout::{GUI_KEY, LayoutStore};
use crate::registry::SharedTypeRegistry;
use crate::store::ModelStore;
use crate::submodel;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::PoisonError;
use tracing::{debug, info, warn};

/// Key of the decouple flag inside an edge's `data`.
pub const DECOUPLE_KEY: &str = "decouple";

/// A document item the loader could not bring into the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedItem {
  /// Node or edge name.
  pub name: String,
  /// Why it was skipped.
  pub reason: String,
}

impl SkippedItem {
  fn new(name: impl Into<String>, reason: impl ToString) -> Self {
    Self {
      name: name.into(),
      reason: reason.to_string(),
    }
  }
}

/// What a load did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
  /// Nodes created in the graph.
  pub created_nodes: Vec<String>,
  /// Nodes left out, with the reason.
  pub skipped_nodes: Vec<SkippedItem>,
  /// Edges added to the graph.
  pub added_edges: Vec<String>,
  /// Edges left out, with the reason. Duplicates are not listed.
  pub skipped_edges: Vec<SkippedItem>,
  /// Nodes that received a configuration override.
  pub configured_nodes: Vec<String>,
  /// Whether a saved layout was applied.
  pub layout_applied: bool,
}

impl LoadReport {
  /// Whether every node and edge of the document made it into the graph.
  #[must_use]
  pub fn is_complete(&self) -> bool {
    self.skipped_nodes.is_empty() && self.skipped_edges.is_empty()
  }
}

/// Loads documents into a graph editor, resolving node types through a shared registry.
pub struct ModelLoader<'a> {
  registry: &'a SharedTypeRegistry,
  store: &'a dyn ModelStore,
}

impl<'a> ModelLoader<'a> {
  /// A loader that registers unknown types from `store` into `registry`.
  pub fn new(registry: &'a SharedTypeRegistry, store: &'a dyn ModelStore) -> Self {
    Self { registry, store }
  }

  /// Loads the active version of `document` into `editor`.
  ///
  /// The version's `data` is coerced to structure and its `gui` key is moved into
  /// `layouts`, so `document` no longer carries it afterwards. A document without a
  /// `gui` key leaves `layouts` as it is.
  ///
  /// # Arguments
  ///
  /// * `document` - The document to load; its active version loses `data.gui`
  /// * `editor` - The live graph to create nodes and edges in
  /// * `layouts` - The layout store that receives the document's layouts
  ///
  /// # Returns
  ///
  /// A [`LoadReport`] listing what was created, configured and skipped. Items that fail
  /// are skipped and reported rather than aborting the load.
  pub fn load(
    &self,
    document: &mut ComponentModelDocument,
    editor: &mut dyn GraphEditor,
    layouts: &mut LayoutStore,
  ) -> LoadReport {
    let mut report = LoadReport::default();
    let model_name = document.name.clone();
    let Some(version) = document.active_version_mut() else {
      warn!(model = %model_name, "document has no version to load");
      return report;
    };

    if let Some(store) = detach_layouts(version) {
      *layouts = store;
    }
    let version: &ModelVersion = version;

    for node_ref in &version.components.nodes {
      self.instantiate_node(node_ref, version, editor, &mut report);
    }
    wire_edges(version, editor, &mut report);
    apply_node_configuration(version, editor, &mut report);
    report.layout_applied = layouts.apply_current(editor);

    info!(
      model = %model_name,
      version = %version.version,
      nodes = report.created_nodes.len(),
      edges = report.added_edges.len(),
      skipped_nodes = report.skipped_nodes.len(),
      skipped_edges = report.skipped_edges.len(),
      "loaded model"
    );
    report
  }

  fn instantiate_node(
    &self,
    node_ref: &NodeRef,
    version: &ModelVersion,
    editor: &mut dyn GraphEditor,
    report: &mut LoadReport,
  ) {
    if editor.get_node(&node_ref.name).is_some() {
      debug!(node = %node_ref.name, "node already in graph");
      return;
    }

    let model = &node_ref.model;
    let registration = {
      let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
      registry.register_type(self.store, &model.domain, &model.name, &model.version)
    };
    let registration = match registration {
      Ok(registration) => registration,
      Err(e) => {
        warn!(node = %node_ref.name, type_key = %model.type_key(), error = %e, "skipping node");
        report.skipped_nodes.push(SkippedItem::new(&node_ref.name, e));
        return;
      }
    };
    if registration.is_new() {
      editor.notify_type_catalog_changed();
    }

    if let Err(e) = editor.create_node(&node_ref.name, registration.template()) {
      warn!(node = %node_ref.name, error = %e, "editor refused node");
      report.skipped_nodes.push(SkippedItem::new(&node_ref.name, e));
      return;
    }
    let Some(mut node) = editor.get_node(&node_ref.name).cloned() else {
      report
        .skipped_nodes
        .push(SkippedItem::new(&node_ref.name, "node vanished after creation"));
      return;
    };

    node.alias = node_ref.alias.clone().filter(|alias| !alias.is_empty());
    for (port_name, alias) in &node_ref.interface_aliases {
      for direction in [PortDirection::Input, PortDirection::Output] {
        if let Some(port) = node.port_mut(direction, port_name) {
          port.alias = Some(alias.clone());
        }
      }
    }
    apply_exports_from_model(&mut node, version);

    match editor.update_node(&node_ref.name, node) {
      Ok(()) => report.created_nodes.push(node_ref.name.clone()),
      Err(e) => report.skipped_nodes.push(SkippedItem::new(&node_ref.name, e)),
    }
  }
}

/// Coerces `version.data` to structure and removes its `gui` key.
///
/// Returns the layout store built from the removed value, if there was one.
pub fn detach_layouts(version: &mut ModelVersion) -> Option<LayoutStore> {
  let data = version.data.take()?;
  let mut data = submodel::read_value(&version.version, &data)?;
  let gui = data.as_object_mut().and_then(|map| map.remove(GUI_KEY));
  let keep = match &data {
    Value::Object(map) => !map.is_empty(),
    Value::Null => false,
    _ => true,
  };
  if keep {
    version.data = Some(data);
  }
  gui.map(LayoutStore::from_value)
}

/// Splits an edge's `data` into the decouple flag and the remaining annotations.
fn split_edge_data(edge_name: &str, data: Option<&Value>) -> (Option<bool>, Option<Value>) {
  let Some(data) = data.and_then(|data| submodel::read_value(edge_name, data)) else {
    return (None, None);
  };
  match data {
    Value::Object(mut map) => {
      let decouple = map.get(DECOUPLE_KEY).and_then(Value::as_bool);
      if decouple.is_some() {
        map.remove(DECOUPLE_KEY);
      } else if let Some(flag) = map.get(DECOUPLE_KEY) {
        warn!(
          edge = %edge_name,
          decouple = %flag,
          "decouple flag is not a bool, keeping it as edge data"
        );
      }
      let rest = (!map.is_empty()).then_some(Value::Object(map));
      (decouple, rest)
    }
    Value::Null => (None, None),
    other => (None, Some(other)),
  }
}

fn graph_edge(edge_ref: &EdgeRef, configuration: Option<Value>) -> GraphEdge {
  let name = edge_ref.resolved_name();
  let (decouple, data) = split_edge_data(&name, edge_ref.data.as_ref());
  let mut edge = GraphEdge::new(
    &edge_ref.from.name,
    &edge_ref.from.interface,
    &edge_ref.to.name,
    &edge_ref.to.interface,
  )
  .with_name(name);
  edge.decouple = decouple;
  edge.data = data;
  edge.configuration = configuration;
  edge
}

fn wire_edges(version: &ModelVersion, editor: &mut dyn GraphEditor, report: &mut LoadReport) {
  let mut configurations: HashMap<&str, Value> = version
    .components
    .configuration
    .edges
    .iter()
    .filter_map(|cfg| {
      let data = cfg.data.as_ref()?;
      submodel::read_value(&cfg.name, data).map(|value| (cfg.name.as_str(), value))
    })
    .collect();

  for edge_ref in &version.components.edges {
    let name = edge_ref.resolved_name();
    let edge = graph_edge(edge_ref, configurations.remove(name.as_str()));
    match editor.add_edge(edge) {
      Ok(()) => report.added_edges.push(name),
      Err(GraphError::DuplicateEdge { .. }) => debug!(edge = %name, "edge already present"),
      Err(e) => {
        warn!(edge = %name, error = %e, "skipping edge");
        report.skipped_edges.push(SkippedItem::new(name, e));
      }
    }
  }

  for name in configurations.keys() {
    debug!(edge = %name, "edge configuration has no matching edge");
  }
}

fn apply_node_configuration(
  version: &ModelVersion,
  editor: &mut dyn GraphEditor,
  report: &mut LoadReport,
) {
  for node_config in &version.components.configuration.nodes {
    let Some(mut node) = editor.get_node(&node_config.name).cloned() else {
      debug!(node = %node_config.name, "configuration has no matching node");
      continue;
    };
    let overrides = submodel::unpack_configuration(&node_config.name, &node_config.configuration);
    if let Some(data) = overrides.data {
      match node.configuration.data.as_mut() {
        Some(base) => submodel::merge_value(base, data),
        None => node.configuration.data = Some(data),
      }
    }
    if !overrides.submodel.is_empty() {
      node.configuration.submodel = overrides.submodel;
    }
    match editor.update_node(&node_config.name, node) {
      Ok(()) => report.configured_nodes.push(node_config.name.clone()),
      Err(e) => warn!(node = %node_config.name, error = %e, "cannot apply configuration"),
    }
  }
}
