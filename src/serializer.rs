//! # Model Serializer
//!
//! Rebuilds a [`ComponentModelDocument`] from the live graph. Every call starts from the
//! base document's active version and regenerates the graph-derived parts from scratch:
//!
//! - `components.nodes` and `components.configuration.nodes`, one entry per node;
//! - `components.edges` and `components.configuration.edges`, one entry per edge;
//! - derived interfaces, collected from exported ports (additive, see [`crate::interface`]);
//! - `data.gui`, after flushing the layout store.
//!
//! Everything else on the version (hand-authored interfaces, default configuration,
//! description, other `data` keys) is carried over from the base document.
//!
//! Node and edge configuration and submodel `data` are written in the configured
//! [`SubDocumentForm`]. Edge `data` and the version's own `data` stay structured.

use crate::document::{
  ComponentModelDocument, EdgeConfig, EdgeRef, Endpoint, ModelVersion, NodeConfig, NodeRef,
};
use crate::graph::{GraphEdge, GraphEditor, GraphNode};
use crate::interface::{clear_derived_interfaces, collect_exports_to_model};
use crate::layout::{GUI_KEY, LayoutStore};
use crate::loader::DECOUPLE_KEY;
use crate::submodel::{self, SubDocumentForm};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Version string given to a model saved for the first time.
pub const INITIAL_VERSION: &str = "1";

/// Serializer settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SerializeOptions {
  /// Drop every derived interface before re-collecting exports.
  pub clear_derived_interfaces: bool,
  /// Form used for configuration sub-documents.
  pub sub_document_form: SubDocumentForm,
}

impl SerializeOptions {
  /// Sets [`SerializeOptions::clear_derived_interfaces`].
  #[must_use]
  pub fn with_clear_derived_interfaces(mut self, clear: bool) -> Self {
    self.clear_derived_interfaces = clear;
    self
  }

  /// Sets [`SerializeOptions::sub_document_form`].
  #[must_use]
  pub fn with_sub_document_form(mut self, form: SubDocumentForm) -> Self {
    self.sub_document_form = form;
    self
  }
}

/// Turns the live graph back into a document.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModelSerializer {
  options: SerializeOptions,
}

impl ModelSerializer {
  /// A serializer with the given options.
  #[must_use]
  pub fn new(options: SerializeOptions) -> Self {
    Self { options }
  }

  /// The serializer's options.
  #[must_use]
  pub fn options(&self) -> SerializeOptions {
    self.options
  }

  /// Rebuilds `base` from the graph in `editor`.
  ///
  /// The returned document keeps `base`'s identity and older versions; its active version
  /// is regenerated. `layouts` is flushed from the editor first.
  ///
  /// # Arguments
  ///
  /// * `base` - The document the graph was loaded from, or a fresh one
  /// * `editor` - The live graph to read nodes, edges and positions from
  /// * `layouts` - The layout store written into the version's `data.gui`
  ///
  /// # Returns
  ///
  /// A new document whose active version reflects the graph. A `base` without versions
  /// gets a single version numbered [`INITIAL_VERSION`].
  pub fn serialize(
    &self,
    base: &ComponentModelDocument,
    editor: &dyn GraphEditor,
    layouts: &mut LayoutStore,
  ) -> ComponentModelDocument {
    let version = base
      .active_version()
      .cloned()
      .unwrap_or_else(|| ModelVersion::new(INITIAL_VERSION));
    let version = self.serialize_version(version, editor, layouts);

    let mut document = base.clone();
    document.upsert_version(version);
    info!(
      domain = %document.domain,
      model = %document.name,
      versions = document.versions.len(),
      "serialized model"
    );
    document
  }

  /// Regenerates the graph-derived parts of `version`.
  pub fn serialize_version(
    &self,
    mut version: ModelVersion,
    editor: &dyn GraphEditor,
    layouts: &mut LayoutStore,
  ) -> ModelVersion {
    let form = self.options.sub_document_form;
    if self.options.clear_derived_interfaces {
      let removed = clear_derived_interfaces(&mut version);
      debug!(removed, "cleared derived interfaces");
    }

    let components = &mut version.components;
    components.nodes.clear();
    components.configuration.nodes.clear();
    components.edges.clear();
    components.configuration.edges.clear();

    let nodes = editor.nodes();
    for node in &nodes {
      version.components.nodes.push(node_ref(node));
      collect_exports_to_model(node, &mut version);
      version.components.configuration.nodes.push(NodeConfig {
        name: node.name.clone(),
        domain: Some(node.model.domain.clone()),
        configuration: submodel::pack_configuration(&node.name, &node.configuration, form),
      });
    }

    for edge in editor.edges() {
      version.components.edges.push(edge_ref(edge));
      if let Some(configuration) = &edge.configuration {
        version.components.configuration.edges.push(EdgeConfig {
          name: edge.name.clone(),
          data: submodel::write_value(&edge.name, configuration, form),
        });
      }
    }

    layouts.flush(editor);
    write_layouts(&mut version, layouts);
    debug!(
      version = %version.version,
      nodes = version.components.nodes.len(),
      edges = version.components.edges.len(),
      interfaces = version.interfaces.len(),
      "serialized version"
    );
    version
  }
}

fn node_ref(node: &GraphNode) -> NodeRef {
  let interface_aliases: BTreeMap<String, String> = node
    .all_ports()
    .filter_map(|port| {
      let alias = port.alias.as_deref().filter(|alias| !alias.is_empty())?;
      Some((port.name().to_string(), alias.to_string()))
    })
    .collect();
  NodeRef {
    name: node.name.clone(),
    alias: node.alias.clone(),
    model: node.model.clone(),
    interface_aliases,
  }
}

fn edge_ref(edge: &GraphEdge) -> EdgeRef {
  let data = match (edge.data.clone(), edge.decouple) {
    (data, None) => data,
    (None, Some(decouple)) => {
      let mut map = Map::new();
      map.insert(DECOUPLE_KEY.to_string(), Value::Bool(decouple));
      Some(Value::Object(map))
    }
    (Some(Value::Object(mut map)), Some(decouple)) => {
      map.insert(DECOUPLE_KEY.to_string(), Value::Bool(decouple));
      Some(Value::Object(map))
    }
    (Some(other), Some(_)) => {
      warn!(edge = %edge.name, "edge data is not a map, dropping decouple flag");
      Some(other)
    }
  };
  EdgeRef {
    name: Some(edge.name.clone()),
    from: Endpoint::new(&edge.from_node, &edge.from_node_output),
    to: Endpoint::new(&edge.to_node, &edge.to_node_input),
    data,
  }
}

fn write_layouts(version: &mut ModelVersion, layouts: &LayoutStore) {
  let gui = match serde_json::to_value(layouts.to_annotations()) {
    Ok(gui) => gui,
    Err(e) => {
      warn!(error = %e, "cannot encode layouts");
      return;
    }
  };
  let mut data = match version
    .data
    .take()
    .and_then(|data| submodel::read_value(&version.version, &data))
  {
    Some(Value::Object(map)) => map,
    Some(Value::Null) | None => Map::new(),
    Some(_) => {
      warn!(version = %version.version, "version data is not a map, replacing it");
      Map::new()
    }
  };
  data.insert(GUI_KEY.to_string(), gui);
  version.data = Some(Value::Object(data));
}
