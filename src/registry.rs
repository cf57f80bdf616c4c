//! # Type Registry
//!
//! Lazily built cache of [`NodeTemplate`]s keyed by type key (`domain::name::version`).
//!
//! A template is built the first time its type is referenced: the registry fetches the
//! referenced model from the [`ModelStore`], turns the model's interface list into ports
//! and keeps the model's default configuration. Later lookups of the same type key are
//! served from the cache without touching the store.
//!
//! ## Port derivation
//!
//! | Interface direction | Ports                                 |
//! |---------------------|---------------------------------------|
//! | `INCOMING`          | one input                             |
//! | `OUTGOING`          | one output                            |
//! | `BIDIRECTIONAL`     | one input and one output, same name   |
//!
//! ## Sharing
//!
//! The registry has no global instance. A session owns a [`SharedTypeRegistry`]; sessions
//! that should share a cache are handed the same handle. Registration holds the write lock
//! across the check and the insert, so concurrent loads never build a template twice.

use crate::document::{ComponentModelDocument, ModelRef, ModelVersion, type_key};
use crate::error::RegistryError;
use crate::graph::{Port, PortDirection};
use crate::store::ModelStore;
use crate::submodel;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Domain of the built-in annotation template.
pub const ANNOTATION_DOMAIN: &str = "gui";
/// Name of the built-in annotation template.
pub const ANNOTATION_NAME: &str = "description";
/// Version of the built-in annotation template.
pub const ANNOTATION_VERSION: &str = "1.0";

/// Registry handle shared between sessions.
pub type SharedTypeRegistry = Arc<RwLock<TypeRegistry>>;

/// Port and configuration shape of a node type.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeTemplate {
  /// Registry key.
  pub type_key: String,
  /// Model the template was built from.
  pub model: ModelRef,
  /// Input ports.
  pub inputs: Vec<Port>,
  /// Output ports.
  pub outputs: Vec<Port>,
  /// Configuration given to new instances, in structured form.
  pub default_configuration: Option<Value>,
  /// Model description.
  pub description: Option<String>,
}

impl NodeTemplate {
  /// Builds the template for `model` from one of its versions.
  #[must_use]
  pub fn from_version(model: ModelRef, version: &ModelVersion) -> Self {
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for interface in &version.interfaces {
      let port = |direction| Port {
        name: interface.name.clone(),
        kind: interface.kind.clone(),
        domain: interface.domain.clone(),
        direction,
        data: interface.data.clone(),
      };
      if interface.direction.has_input() {
        inputs.push(port(PortDirection::Input));
      }
      if interface.direction.has_output() {
        outputs.push(port(PortDirection::Output));
      }
    }
    let type_key = model.type_key();
    let default_configuration = version
      .default_configuration
      .as_ref()
      .and_then(|value| submodel::read_value(&type_key, value));
    Self {
      type_key,
      model,
      inputs,
      outputs,
      default_configuration,
      description: version.description.clone(),
    }
  }

  /// The port-less template used for free-floating text notes.
  #[must_use]
  pub fn annotation() -> Self {
    let model = ModelRef::new(ANNOTATION_DOMAIN, ANNOTATION_NAME, ANNOTATION_VERSION);
    Self {
      type_key: model.type_key(),
      model,
      inputs: Vec::new(),
      outputs: Vec::new(),
      default_configuration: None,
      description: Some("Free-floating annotation".to_string()),
    }
  }
}

/// Outcome of [`TypeRegistry::register_type`].
#[derive(Clone, Debug)]
pub enum Registration {
  /// The type was already known.
  Cached(Arc<NodeTemplate>),
  /// The type was fetched and inserted.
  Inserted(Arc<NodeTemplate>),
}

impl Registration {
  /// The registered template.
  #[must_use]
  pub fn template(&self) -> &Arc<NodeTemplate> {
    match self {
      Self::Cached(t) | Self::Inserted(t) => t,
    }
  }

  /// Whether this call added a new type to the catalog.
  #[must_use]
  pub fn is_new(&self) -> bool {
    matches!(self, Self::Inserted(_))
  }
}

/// Cache of node templates keyed by type key.
#[derive(Debug)]
pub struct TypeRegistry {
  templates: HashMap<String, Arc<NodeTemplate>>,
}

impl Default for TypeRegistry {
  fn default() -> Self {
    Self::new()
  }
}

impl TypeRegistry {
  /// A registry holding only the annotation template.
  #[must_use]
  pub fn new() -> Self {
    let annotation = NodeTemplate::annotation();
    let mut templates = HashMap::new();
    templates.insert(annotation.type_key.clone(), Arc::new(annotation));
    Self { templates }
  }

  /// A registry seeded from every model document found in `search_paths`.
  ///
  /// Unreadable directories and files are logged and skipped.
  #[must_use]
  pub fn with_search_paths(search_paths: &[PathBuf]) -> Self {
    let mut registry = Self::new();
    for path in search_paths {
      match registry.discover(path) {
        Ok(count) => info!(path = %path.display(), templates = count, "seeded local templates"),
        Err(e) => warn!(error = %e, "skipping search path"),
      }
    }
    registry
  }

  /// Wraps the registry in a shareable handle.
  #[must_use]
  pub fn into_shared(self) -> SharedTypeRegistry {
    Arc::new(RwLock::new(self))
  }

  /// Adds a template for every version of every model document in `dir`.
  ///
  /// Files ending in `.yaml`, `.yml` or `.json` are considered. Returns the number of
  /// templates added.
  ///
  /// # Errors
  ///
  /// Returns [`RegistryError::Discovery`] if `dir` cannot be listed.
  pub fn discover(&mut self, dir: &Path) -> Result<usize, RegistryError> {
    let entries = std::fs::read_dir(dir).map_err(|source| RegistryError::Discovery {
      path: dir.to_path_buf(),
      source,
    })?;
    let mut paths: Vec<PathBuf> = entries
      .filter_map(Result::ok)
      .map(|entry| entry.path())
      .filter(|path| is_model_file(path))
      .collect();
    paths.sort();

    let mut added = 0;
    for path in paths {
      let document = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|text| ComponentModelDocument::parse(&text).map_err(|e| e.to_string()));
      match document {
        Ok(document) => added += self.insert_document(&document),
        Err(e) => warn!(file = %path.display(), error = %e, "skipping local model"),
      }
    }
    Ok(added)
  }

  /// Inserts a template for every version of `document`. Returns how many were new.
  pub fn insert_document(&mut self, document: &ComponentModelDocument) -> usize {
    let mut added = 0;
    for version in &document.versions {
      let template = NodeTemplate::from_version(document.model_ref(&version.version), version);
      if !self.templates.contains_key(&template.type_key) {
        self
          .templates
          .insert(template.type_key.clone(), Arc::new(template));
        added += 1;
      }
    }
    added
  }

  /// Whether a template is registered under `type_key`.
  #[must_use]
  pub fn has_type(&self, type_key: &str) -> bool {
    self.templates.contains_key(type_key)
  }

  /// The template registered under `type_key`.
  #[must_use]
  pub fn get_template(&self, type_key: &str) -> Option<Arc<NodeTemplate>> {
    self.templates.get(type_key).cloned()
  }

  /// Registered type keys, sorted.
  #[must_use]
  pub fn type_keys(&self) -> Vec<String> {
    let mut keys: Vec<String> = self.templates.keys().cloned().collect();
    keys.sort();
    keys
  }

  /// Number of registered templates.
  #[must_use]
  pub fn len(&self) -> usize {
    self.templates.len()
  }

  /// Whether no template is registered.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.templates.is_empty()
  }

  /// Makes sure a template for `domain::name::version` is registered.
  ///
  /// Known types return immediately. Otherwise the model is fetched from `store`
  /// (restricted to `version`), converted and inserted. Nothing is inserted on failure.
  ///
  /// # Arguments
  ///
  /// * `store` - The model store consulted for unknown types
  /// * `domain` - The model's domain
  /// * `name` - The model's name
  /// * `version` - The model version to register
  ///
  /// # Returns
  ///
  /// [`Registration::Cached`] if the type was already known, [`Registration::Inserted`]
  /// if it was fetched and added.
  ///
  /// # Errors
  ///
  /// Fails if the store errors or returns a document without the requested version.
  pub fn register_type(
    &mut self,
    store: &dyn ModelStore,
    domain: &str,
    name: &str,
    version: &str,
  ) -> Result<Registration, RegistryError> {
    let key = type_key(domain, name, version);
    if let Some(template) = self.templates.get(&key) {
      debug!(type_key = %key, "type already registered");
      return Ok(Registration::Cached(Arc::clone(template)));
    }

    let document = store
      .fetch_model(domain, name, version, true)
      .map_err(|source| RegistryError::Store {
        type_key: key.clone(),
        source,
      })?;
    let model_version = document
      .version(version)
      .ok_or_else(|| RegistryError::EmptyDocument {
        type_key: key.clone(),
      })?;

    let template = Arc::new(NodeTemplate::from_version(
      ModelRef::new(domain, name, version),
      model_version,
    ));
    self.templates.insert(key.clone(), Arc::clone(&template));
    info!(
      type_key = %key,
      inputs = template.inputs.len(),
      outputs = template.outputs.len(),
      "registered node type"
    );
    Ok(Registration::Inserted(template))
  }
}

fn is_model_file(path: &Path) -> bool {
  path.is_file()
    && path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| matches!(ext, "yaml" | "yml" | "json"))
}
