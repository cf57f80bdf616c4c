//! # Error Types
//!
//! Error enums for every fallible boundary in the crate.
//!
//! The load and save paths are best-effort: per-item problems are logged and reported
//! (see [`LoadReport`](crate::loader::LoadReport)) rather than raised. The enums below
//! carry the reason for the cases that are surfaced to callers, mostly at the
//! store, registry and configuration boundaries.

use std::path::PathBuf;

/// Errors produced when reading or writing a component-model document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
  /// The document text was neither valid JSON nor valid YAML.
  #[error("invalid document: {0}")]
  Parse(#[from] serde_yaml::Error),
  /// Serializing the document to JSON failed.
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

/// Errors produced by the sub-document codec.
///
/// These never abort a pack/unpack pass; the offending entry is skipped and the
/// error is logged.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
  /// An embedded sub-document string could not be parsed.
  #[error("malformed sub-document in '{name}': {source}")]
  Parse {
    /// Name of the entry holding the sub-document.
    name: String,
    /// Parser error.
    #[source]
    source: serde_yaml::Error,
  },
  /// A structured sub-document could not be serialized to text.
  #[error("cannot serialize sub-document in '{name}': {source}")]
  Serialize {
    /// Name of the entry holding the sub-document.
    name: String,
    /// Serializer error.
    #[source]
    source: serde_json::Error,
  },
}

/// Errors produced by a [`ModelStore`](crate::store::ModelStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// I/O error reading or writing a stored model.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  /// A stored model could not be decoded or encoded.
  #[error("document error in {path}: {source}")]
  Document {
    /// File holding the model.
    path: PathBuf,
    /// Decoding error.
    #[source]
    source: DocumentError,
  },
  /// No model is stored under (domain, name).
  #[error("model '{domain}::{name}' not found")]
  NotFound {
    /// Model domain.
    domain: String,
    /// Model name.
    name: String,
  },
  /// The domain or name cannot be used as a storage key.
  #[error("invalid model identifier '{0}'")]
  InvalidIdentifier(String),
}

/// Errors produced while registering a node template.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
  /// The model store returned a document without the requested version.
  #[error("model store returned an empty document for '{type_key}'")]
  EmptyDocument {
    /// Type key that was requested.
    type_key: String,
  },
  /// The model store failed.
  #[error("model store lookup failed for '{type_key}': {source}")]
  Store {
    /// Type key that was requested.
    type_key: String,
    /// Underlying store error.
    #[source]
    source: StoreError,
  },
  /// A search path could not be scanned.
  #[error("cannot scan search path {path}: {source}")]
  Discovery {
    /// Directory being scanned.
    path: PathBuf,
    /// I/O error.
    #[source]
    source: std::io::Error,
  },
}

/// Errors produced by graph editing operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
  /// A node with the given name already exists.
  #[error("node with name '{0}' already exists")]
  NodeExists(String),
  /// No node with the given name exists.
  #[error("node '{0}' does not exist")]
  NodeNotFound(String),
  /// The node has no such port.
  #[error("node '{node}' does not have {direction} port '{port}'")]
  PortNotFound {
    /// Node name.
    node: String,
    /// Port name.
    port: String,
    /// "input" or "output".
    direction: &'static str,
  },
  /// An edge connecting the same endpoints already exists.
  #[error("edge {from_node}.{from_port} -> {to_node}.{to_port} already exists")]
  DuplicateEdge {
    /// Source node name.
    from_node: String,
    /// Source output port.
    from_port: String,
    /// Target node name.
    to_node: String,
    /// Target input port.
    to_port: String,
  },
  /// No edge with the given id exists.
  #[error("edge '{0}' not found")]
  EdgeNotFound(String),
}

/// Errors produced when loading a [`SessionConfig`](crate::config::SessionConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The configuration file could not be read.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  /// The configuration file is not valid YAML for the schema.
  #[error("yaml error: {0}")]
  Yaml(#[from] serde_yaml::Error),
}

/// Errors produced when installing the tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
  /// The filter directive could not be parsed.
  #[error("invalid log filter '{filter}': {message}")]
  InvalidFilter {
    /// Filter string.
    filter: String,
    /// Parser message.
    message: String,
  },
  /// The subscriber could not be installed.
  #[error("failed to initialize tracing: {0}")]
  Init(String),
}

/// Errors surfaced by [`ModelSession`](crate::session::ModelSession).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
  /// The model store failed.
  #[error("store error: {0}")]
  Store(#[from] StoreError),
  /// The store returned no version to open.
  #[error("model '{domain}::{name}' has no version '{version}'")]
  MissingVersion {
    /// Model domain.
    domain: String,
    /// Model name.
    name: String,
    /// Requested version.
    version: String,
  },
  /// A layout operation named a layout that does not exist.
  #[error("layout '{0}' does not exist")]
  UnknownLayout(String),
  /// A graph editing operation failed.
  #[error("graph error: {0}")]
  Graph(#[from] GraphError),
}

/// Error when writing a diagram export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
  /// The model has no version to render.
  #[error("document '{0}' has no version to export")]
  NoVersion(String),
  /// I/O error writing the diagram.
  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}
