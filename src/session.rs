//! # Editing Session
//!
//! [`ModelSession`] is what a graph editor talks to. It ties together one open model:
//!
//! - the editor holding the live graph,
//! - the model store documents are read from and saved to,
//! - a [`SharedTypeRegistry`], possibly shared with other sessions,
//! - the [`LayoutStore`] for the open model,
//! - the base document the graph was loaded from.
//!
//! Loading and saving delegate to [`ModelLoader`] and [`ModelSerializer`]. The session
//! adds the store round trip and the boolean surface editors expect for
//! [`register_type`](ModelSession::register_type) and [`save`](ModelSession::save).

use crate::config::SessionConfig;
use crate::document::ComponentModelDocument;
use crate::error::{ExportError, RegistryError, SessionError};
use crate::graph::GraphEditor;
use crate::interface;
use crate::layout::LayoutStore;
use crate::loader::{LoadReport, ModelLoader};
use crate::mermaid;
use crate::registry::{Registration, SharedTypeRegistry, TypeRegistry};
use crate::serializer::ModelSerializer;
use crate::store::{FileModelStore, ModelStore};
use std::path::{Path, PathBuf};
use std::sync::PoisonError;
use tracing::{error, info, warn};

/// One open model bound to an editor and a store.
pub struct ModelSession<S: ModelStore, E: GraphEditor> {
  config: SessionConfig,
  registry: SharedTypeRegistry,
  store: S,
  editor: E,
  layouts: LayoutStore,
  document: ComponentModelDocument,
}

impl<E: GraphEditor> ModelSession<FileModelStore, E> {
  /// A session backed by a [`FileModelStore`] at `config.store_root`, or the current
  /// directory when unset.
  pub fn from_config(config: SessionConfig, editor: E) -> Self {
    let root = config
      .store_root
      .clone()
      .unwrap_or_else(|| PathBuf::from("."));
    Self::new(config, FileModelStore::new(root), editor)
  }
}

impl<S: ModelStore, E: GraphEditor> ModelSession<S, E> {
  /// A session with its own registry, seeded from `config.search_paths`.
  pub fn new(config: SessionConfig, store: S, editor: E) -> Self {
    let registry = TypeRegistry::with_search_paths(&config.search_paths).into_shared();
    Self::with_registry(config, registry, store, editor)
  }

  /// A session using an existing registry handle.
  pub fn with_registry(
    config: SessionConfig,
    registry: SharedTypeRegistry,
    store: S,
    editor: E,
  ) -> Self {
    Self {
      config,
      registry,
      store,
      editor,
      layouts: LayoutStore::new(),
      document: ComponentModelDocument::default(),
    }
  }

  /// Session configuration.
  pub fn config(&self) -> &SessionConfig {
    &self.config
  }

  /// The registry handle.
  pub fn registry(&self) -> &SharedTypeRegistry {
    &self.registry
  }

  /// The model store.
  pub fn store(&self) -> &S {
    &self.store
  }

  /// Mutable access to the model store.
  pub fn store_mut(&mut self) -> &mut S {
    &mut self.store
  }

  /// The editor.
  pub fn editor(&self) -> &E {
    &self.editor
  }

  /// Mutable access to the editor, for user edits.
  pub fn editor_mut(&mut self) -> &mut E {
    &mut self.editor
  }

  /// The layout store.
  pub fn layouts(&self) -> &LayoutStore {
    &self.layouts
  }

  /// The document the graph was loaded from, without its `gui` annotations.
  pub fn document(&self) -> &ComponentModelDocument {
    &self.document
  }

  /// Loads `document` into the editor and makes it the session's base document.
  ///
  /// Layouts are reset to the ones carried by the document.
  pub fn load_document(&mut self, mut document: ComponentModelDocument) -> LoadReport {
    self.layouts = LayoutStore::new();
    let report = ModelLoader::new(&self.registry, &self.store).load(
      &mut document,
      &mut self.editor,
      &mut self.layouts,
    );
    if !report.is_complete() {
      warn!(
        model = %document.name,
        skipped_nodes = report.skipped_nodes.len(),
        skipped_edges = report.skipped_edges.len(),
        "model loaded partially"
      );
    }
    self.document = document;
    report
  }

  /// Fetches `domain::name` at `version` from the store and loads it.
  ///
  /// # Errors
  ///
  /// Fails if the store errors or has no such version.
  pub fn open(
    &mut self,
    domain: &str,
    name: &str,
    version: &str,
  ) -> Result<LoadReport, SessionError> {
    let document = self.store.fetch_model(domain, name, version, true)?;
    if document.is_empty() {
      return Err(SessionError::MissingVersion {
        domain: domain.to_string(),
        name: name.to_string(),
        version: version.to_string(),
      });
    }
    Ok(self.load_document(document))
  }

  fn serializer(&self) -> ModelSerializer {
    ModelSerializer::new(self.config.serialize_options())
  }

  /// Rebuilds the document from the current graph.
  pub fn serialize_document(&mut self) -> ComponentModelDocument {
    let serializer = self.serializer();
    serializer.serialize(&self.document, &self.editor, &mut self.layouts)
  }

  /// Serializes the graph and stores the result.
  ///
  /// # Errors
  ///
  /// Returns the store's error.
  pub fn try_save(&mut self) -> Result<ComponentModelDocument, SessionError> {
    let document = self.serialize_document();
    self.store.store_model(&document)?;
    info!(domain = %document.domain, model = %document.name, "saved model");
    Ok(document)
  }

  /// Serializes the graph and stores the result. Returns whether the store accepted it.
  pub fn save(&mut self) -> bool {
    match self.try_save() {
      Ok(_) => true,
      Err(e) => {
        error!(model = %self.document.name, error = %e, "save failed");
        false
      }
    }
  }

  /// Registers `domain::name::version`, notifying the editor when the type is new.
  ///
  /// # Errors
  ///
  /// Returns the registry's error; nothing is inserted on failure.
  pub fn try_register_type(
    &mut self,
    domain: &str,
    name: &str,
    version: &str,
  ) -> Result<Registration, RegistryError> {
    let registration = self
      .registry
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .register_type(&self.store, domain, name, version)?;
    if registration.is_new() {
      self.editor.notify_type_catalog_changed();
    }
    Ok(registration)
  }

  /// Registers `domain::name::version`. Returns whether the type is now known.
  pub fn register_type(&mut self, domain: &str, name: &str, version: &str) -> bool {
    match self.try_register_type(domain, name, version) {
      Ok(_) => true,
      Err(e) => {
        warn!(domain, name, version, error = %e, "type registration failed");
        false
      }
    }
  }

  /// Type keys of every registered template, sorted.
  pub fn template_catalog(&self) -> Vec<String> {
    self
      .registry
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .type_keys()
  }

  /// Applies a user rename to node `name`; its identity key stays `name`.
  ///
  /// # Errors
  ///
  /// Returns [`GraphError::NodeNotFound`](crate::error::GraphError::NodeNotFound) if
  /// there is no such node.
  pub fn rename_node(&mut self, name: &str, new_name: &str) -> Result<(), SessionError> {
    let mut node = self
      .editor
      .get_node(name)
      .cloned()
      .ok_or_else(|| crate::error::GraphError::NodeNotFound(name.to_string()))?;
    node.rename(new_name);
    self.editor.update_node(name, node)?;
    Ok(())
  }

  /// Switches to layout `name`. Returns whether a stored snapshot was applied.
  pub fn select_layout(&mut self, name: &str) -> bool {
    self.layouts.select_layout(name, &mut self.editor)
  }

  /// Stores the editor's current positions as layout `name`.
  pub fn add_layout(&mut self, name: &str) {
    let snapshot = self.editor.current_layout_snapshot();
    self.layouts.add_layout(name, snapshot);
  }

  /// Removes layout `name`.
  ///
  /// # Errors
  ///
  /// Returns [`SessionError::UnknownLayout`] if there is no such layout.
  pub fn remove_layout(&mut self, name: &str) -> Result<(), SessionError> {
    if self.layouts.remove_layout(name) {
      Ok(())
    } else {
      Err(SessionError::UnknownLayout(name.to_string()))
    }
  }

  /// Drops every derived interface from the base document's active version, so the next
  /// save lists only the ports exported at that time. Returns the number dropped.
  pub fn clear_derived_interfaces(&mut self) -> usize {
    self
      .document
      .active_version_mut()
      .map_or(0, interface::clear_derived_interfaces)
  }

  /// Serializes the graph and writes it as a Mermaid diagram to `path`.
  ///
  /// # Errors
  ///
  /// Fails if the file cannot be written.
  pub fn export_mermaid(&mut self, path: &Path) -> Result<(), ExportError> {
    let document = self.serialize_document();
    mermaid::write_mermaid(path, &document)
  }
}
