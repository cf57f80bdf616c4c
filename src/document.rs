//! # Component Model Documents
//!
//! The persisted, versioned description of a reusable part. A document is identified by
//! `(domain, name)` and carries an ordered list of [`ModelVersion`]s; the last entry is the
//! active version.
//!
//! These are serde DTOs whose field names match the stored YAML/JSON shape
//! (`linkToNode`, `defaultConfiguration`, `interface_aliases`, ...). Shape is validated
//! once, when a document is decoded; the loader and serializer work on typed fields.
//!
//! Sub-document fields (`data`, per-node and per-edge configuration `data`) are kept as
//! [`serde_json::Value`] and may hold either structure or an embedded serialized string.
//! See [`crate::submodel`] for the coercion rules.

use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Separator between the components of a type key.
pub const TYPE_KEY_SEPARATOR: &str = "::";

/// Computes the type key `domain::name::version` used to index node templates.
///
/// Both the loader and the registry go through this function so cache lookups agree.
#[must_use]
pub fn type_key(domain: &str, name: &str, version: &str) -> String {
  format!(
    "{domain}{sep}{name}{sep}{version}",
    sep = TYPE_KEY_SEPARATOR
  )
}

/// Direction of an interface on a component model.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
  /// Data flows into the component.
  #[default]
  Incoming,
  /// Data flows out of the component.
  Outgoing,
  /// Both directions; yields one input and one output port of the same name.
  Bidirectional,
}

impl Direction {
  /// Whether this direction produces an input port.
  #[must_use]
  pub fn has_input(self) -> bool {
    matches!(self, Self::Incoming | Self::Bidirectional)
  }

  /// Whether this direction produces an output port.
  #[must_use]
  pub fn has_output(self) -> bool {
    matches!(self, Self::Outgoing | Self::Bidirectional)
  }
}

/// One entry of a model's interface list.
///
/// An entry with `link_to_node` set is derived: it was exported from a contained node's
/// port and is regenerated from the graph on save.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDescriptor {
  /// Interface name as seen from outside the composite.
  pub name: String,
  /// Data type carried by the interface.
  #[serde(rename = "type", default)]
  pub kind: String,
  /// Interface direction.
  pub direction: Direction,
  /// Domain the interface type belongs to.
  #[serde(default)]
  pub domain: String,
  /// Name of the contained node this interface was exported from.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub link_to_node: Option<String>,
  /// Port name on `link_to_node`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub link_to_interface: Option<String>,
  /// Free-form interface annotations.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
}

impl InterfaceDescriptor {
  /// Whether this descriptor was produced by exporting a node port.
  #[must_use]
  pub fn is_derived(&self) -> bool {
    self.link_to_node.is_some()
  }
}

/// Reference to a specific version of a stored component model.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct ModelRef {
  /// Model domain.
  pub domain: String,
  /// Model name.
  pub name: String,
  /// Model version.
  pub version: String,
}

impl ModelRef {
  /// Creates a model reference.
  pub fn new(
    domain: impl Into<String>,
    name: impl Into<String>,
    version: impl Into<String>,
  ) -> Self {
    Self {
      domain: domain.into(),
      name: name.into(),
      version: version.into(),
    }
  }

  /// The registry type key for this reference.
  #[must_use]
  pub fn type_key(&self) -> String {
    type_key(&self.domain, &self.name, &self.version)
  }
}

/// A persisted node instance inside a composite model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRef {
  /// Stable identity key of the node.
  pub name: String,
  /// Display override; never replaces `name`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alias: Option<String>,
  /// Type of the node.
  pub model: ModelRef,
  /// Port name to port display alias.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub interface_aliases: BTreeMap<String, String>,
}

/// One end of a persisted connection.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
  /// Node name.
  pub name: String,
  /// Port name on that node.
  pub interface: String,
}

impl Endpoint {
  /// Creates an endpoint.
  pub fn new(name: impl Into<String>, interface: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      interface: interface.into(),
    }
  }
}

/// A persisted connection between two node ports.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeRef {
  /// Edge name; synthesized from the endpoints when absent.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  /// Source (output) endpoint.
  pub from: Endpoint,
  /// Target (input) endpoint.
  pub to: Endpoint,
  /// Edge annotations such as `decouple`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
}

impl EdgeRef {
  /// The stored name, or `fromNode_fromPort_toNode_toPort` when none is stored.
  #[must_use]
  pub fn resolved_name(&self) -> String {
    self.name.clone().unwrap_or_else(|| {
      edge_name(
        &self.from.name,
        &self.from.interface,
        &self.to.name,
        &self.to.interface,
      )
    })
  }
}

/// Synthesized edge name `fromNode_fromPort_toNode_toPort`.
#[must_use]
pub fn edge_name(from_node: &str, from_port: &str, to_node: &str, to_port: &str) -> String {
  format!("{from_node}_{from_port}_{to_node}_{to_port}")
}

/// One entry of a nested sub-assembly tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmodelEntry {
  /// Entry name.
  pub name: String,
  /// Sub-document: structure, or an embedded serialized string.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
  /// Nested entries.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub submodel: Vec<SubmodelEntry>,
}

/// Configuration payload of a node: a sub-document plus nested sub-assemblies.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfiguration {
  /// Sub-document: structure, or an embedded serialized string.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
  /// Nested sub-assembly entries.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub submodel: Vec<SubmodelEntry>,
}

impl NodeConfiguration {
  /// Whether neither `data` nor `submodel` is set.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.data.is_none() && self.submodel.is_empty()
  }
}

/// Per-node configuration override stored with a composite.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
  /// Node name the override applies to.
  pub name: String,
  /// Domain of the node's model.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub domain: Option<String>,
  /// The override itself.
  #[serde(flatten)]
  pub configuration: NodeConfiguration,
}

/// Per-edge configuration stored with a composite.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeConfig {
  /// Edge name the configuration applies to.
  pub name: String,
  /// Sub-document: structure, or an embedded serialized string.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
}

/// Node and edge configuration lists.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationSet {
  /// Node overrides.
  #[serde(default)]
  pub nodes: Vec<NodeConfig>,
  /// Edge configuration.
  #[serde(default)]
  pub edges: Vec<EdgeConfig>,
}

/// Contained nodes, their connections, and their configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
  /// Node instances.
  #[serde(default)]
  pub nodes: Vec<NodeRef>,
  /// Connections.
  #[serde(default)]
  pub edges: Vec<EdgeRef>,
  /// Configuration overrides.
  #[serde(default)]
  pub configuration: ConfigurationSet,
}

/// One version of a component model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelVersion {
  /// Version string.
  pub version: String,
  /// Public interfaces, hand-authored and derived.
  #[serde(default)]
  pub interfaces: Vec<InterfaceDescriptor>,
  /// Sub-assembly, for composite models.
  #[serde(default)]
  pub components: Components,
  /// Configuration applied to new instances of this model.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_configuration: Option<Value>,
  /// Free-form annotations; the `gui` key holds saved layouts.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
  /// Human-readable description.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

impl ModelVersion {
  /// Creates an empty version.
  pub fn new(version: impl Into<String>) -> Self {
    Self {
      version: version.into(),
      ..Self::default()
    }
  }
}

/// A persisted component model with all of its versions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentModelDocument {
  /// Model domain.
  pub domain: String,
  /// Model name.
  pub name: String,
  /// Model kind, reported by store listings.
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub kind: Option<String>,
  /// Versions, oldest first.
  #[serde(default)]
  pub versions: Vec<ModelVersion>,
}

impl ComponentModelDocument {
  /// Creates a document with no versions.
  pub fn new(domain: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      domain: domain.into(),
      name: name.into(),
      ..Self::default()
    }
  }

  /// Decodes a document from JSON or YAML text.
  ///
  /// JSON is tried first so numbers round-trip exactly; anything else goes through
  /// the YAML parser.
  pub fn parse(text: &str) -> Result<Self, DocumentError> {
    if let Ok(document) = serde_json::from_str(text) {
      return Ok(document);
    }
    Ok(serde_yaml::from_str(text)?)
  }

  /// Encodes the document as YAML.
  pub fn to_yaml_string(&self) -> Result<String, DocumentError> {
    Ok(serde_yaml::to_string(self)?)
  }

  /// Encodes the document as pretty-printed JSON.
  pub fn to_json_string(&self) -> Result<String, DocumentError> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Whether the document carries no version at all.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.versions.is_empty()
  }

  /// The active (most recent) version.
  #[must_use]
  pub fn active_version(&self) -> Option<&ModelVersion> {
    self.versions.last()
  }

  /// Mutable access to the active version.
  pub fn active_version_mut(&mut self) -> Option<&mut ModelVersion> {
    self.versions.last_mut()
  }

  /// Looks up a version by its version string.
  #[must_use]
  pub fn version(&self, version: &str) -> Option<&ModelVersion> {
    self.versions.iter().find(|v| v.version == version)
  }

  /// Replaces the version with the same version string, or appends it.
  pub fn upsert_version(&mut self, version: ModelVersion) {
    match self
      .versions
      .iter_mut()
      .find(|v| v.version == version.version)
    {
      Some(existing) => *existing = version,
      None => self.versions.push(version),
    }
  }

  /// A copy of this document restricted to one version (no versions if absent).
  #[must_use]
  pub fn limited_to(&self, version: &str) -> Self {
    Self {
      domain: self.domain.clone(),
      name: self.name.clone(),
      kind: self.kind.clone(),
      versions: self.version(version).cloned().into_iter().collect(),
    }
  }

  /// Reference to the given version of this model.
  #[must_use]
  pub fn model_ref(&self, version: &str) -> ModelRef {
    ModelRef::new(&self.domain, &self.name, version)
  }
}
