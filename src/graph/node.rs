//! # Graph Nodes and Ports
//!
//! A [`GraphNode`] is an instance of a [`NodeTemplate`]: it copies the template's ports
//! into [`PortInstance`]s that can additionally carry export flags, an initial value and
//! a display alias.
//!
//! A node's `name` is its identity. It never changes after creation; renames only set
//! `alias`.

use crate::document::{Direction, ModelRef, NodeConfiguration};
use crate::registry::NodeTemplate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which side of a node a port sits on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
  /// Receives data.
  Input,
  /// Emits data.
  Output,
}

impl PortDirection {
  /// Lower-case label used in messages.
  #[must_use]
  pub fn label(self) -> &'static str {
    match self {
      Self::Input => "input",
      Self::Output => "output",
    }
  }

  /// The interface direction a port on this side exports as.
  #[must_use]
  pub fn interface_direction(self) -> Direction {
    match self {
      Self::Input => Direction::Incoming,
      Self::Output => Direction::Outgoing,
    }
  }
}

/// A named, directed connection point on a node template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Port {
  /// Port name.
  pub name: String,
  /// Data type carried by the port.
  #[serde(rename = "type")]
  pub kind: String,
  /// Domain of the data type.
  pub domain: String,
  /// Side of the node.
  pub direction: PortDirection,
  /// Interface annotations copied from the model.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
}

/// Whether and how a port is exported to the composite's interface list.
///
/// Stored as `0`, `1` or `2`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ExportMode {
  /// Not exported.
  #[default]
  NotExported,
  /// Exported under an auto-generated `node:port` name.
  Auto,
  /// Exported under an explicit `interface_export_name`.
  Named,
}

impl ExportMode {
  /// Whether the port is exported at all.
  #[must_use]
  pub fn is_exported(self) -> bool {
    self != Self::NotExported
  }
}

impl From<ExportMode> for u8 {
  fn from(mode: ExportMode) -> Self {
    match mode {
      ExportMode::NotExported => 0,
      ExportMode::Auto => 1,
      ExportMode::Named => 2,
    }
  }
}

impl TryFrom<u8> for ExportMode {
  type Error = String;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Self::NotExported),
      1 => Ok(Self::Auto),
      2 => Ok(Self::Named),
      other => Err(format!("invalid export mode {other}, expected 0, 1 or 2")),
    }
  }
}

/// A port on a live node.
#[derive(Clone, Debug, PartialEq)]
pub struct PortInstance {
  /// The template port.
  pub port: Port,
  /// Export flag.
  pub interface: ExportMode,
  /// Export name, used when the port is exported.
  pub interface_export_name: Option<String>,
  /// Initial value for the port.
  pub init_value: Option<Value>,
  /// Display alias.
  pub alias: Option<String>,
}

impl PortInstance {
  /// An unexported instance of `port`.
  #[must_use]
  pub fn new(port: Port) -> Self {
    Self {
      port,
      interface: ExportMode::NotExported,
      interface_export_name: None,
      init_value: None,
      alias: None,
    }
  }

  /// Port name.
  #[must_use]
  pub fn name(&self) -> &str {
    &self.port.name
  }

  /// Marks the port exported, under `name` when given.
  pub fn export(&mut self, name: Option<String>) {
    self.interface = if name.is_some() {
      ExportMode::Named
    } else {
      ExportMode::Auto
    };
    self.interface_export_name = name;
  }

  /// Clears the export flag and name.
  pub fn unexport(&mut self) {
    self.interface = ExportMode::NotExported;
    self.interface_export_name = None;
  }
}

/// A live component instance.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
  /// Opaque id assigned by the editor.
  pub id: String,
  /// Stable identity key.
  pub name: String,
  /// Display override.
  pub alias: Option<String>,
  /// Model this node instantiates.
  pub model: ModelRef,
  /// Registry key of `model`.
  pub type_key: String,
  /// Input ports.
  pub inputs: Vec<PortInstance>,
  /// Output ports.
  pub outputs: Vec<PortInstance>,
  /// Node configuration, kept in structured form.
  pub configuration: NodeConfiguration,
}

impl GraphNode {
  /// Instantiates `template` as a node called `name`.
  ///
  /// The template's default configuration becomes the node's initial `data`.
  #[must_use]
  pub fn from_template(id: impl Into<String>, name: impl Into<String>, template: &NodeTemplate) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      alias: None,
      model: template.model.clone(),
      type_key: template.type_key.clone(),
      inputs: template.inputs.iter().cloned().map(PortInstance::new).collect(),
      outputs: template.outputs.iter().cloned().map(PortInstance::new).collect(),
      configuration: NodeConfiguration {
        data: template.default_configuration.clone(),
        submodel: Vec::new(),
      },
    }
  }

  /// The alias if set, otherwise the name.
  #[must_use]
  pub fn display_name(&self) -> &str {
    self.alias.as_deref().unwrap_or(&self.name)
  }

  /// Applies a user rename.
  ///
  /// `name` is left as is; `new_name` becomes the alias, or clears it when it equals
  /// the name.
  pub fn rename(&mut self, new_name: &str) {
    self.alias = if new_name == self.name || new_name.is_empty() {
      None
    } else {
      Some(new_name.to_string())
    };
  }

  /// Ports on the given side.
  #[must_use]
  pub fn ports(&self, direction: PortDirection) -> &[PortInstance] {
    match direction {
      PortDirection::Input => &self.inputs,
      PortDirection::Output => &self.outputs,
    }
  }

  /// Mutable ports on the given side.
  pub fn ports_mut(&mut self, direction: PortDirection) -> &mut [PortInstance] {
    match direction {
      PortDirection::Input => &mut self.inputs,
      PortDirection::Output => &mut self.outputs,
    }
  }

  /// Finds a port by side and name.
  #[must_use]
  pub fn port(&self, direction: PortDirection, name: &str) -> Option<&PortInstance> {
    self.ports(direction).iter().find(|p| p.name() == name)
  }

  /// Finds a port by side and name, mutably.
  pub fn port_mut(&mut self, direction: PortDirection, name: &str) -> Option<&mut PortInstance> {
    self.ports_mut(direction).iter_mut().find(|p| p.name() == name)
  }

  /// Whether the node has an input port called `name`.
  #[must_use]
  pub fn has_input_port(&self, name: &str) -> bool {
    self.port(PortDirection::Input, name).is_some()
  }

  /// Whether the node has an output port called `name`.
  #[must_use]
  pub fn has_output_port(&self, name: &str) -> bool {
    self.port(PortDirection::Output, name).is_some()
  }

  /// All ports, inputs first.
  pub fn all_ports(&self) -> impl Iterator<Item = &PortInstance> {
    self.inputs.iter().chain(self.outputs.iter())
  }
}
