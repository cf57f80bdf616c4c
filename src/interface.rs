//! # Interface Export
//!
//! A composite model exposes some of its contained nodes' ports as its own interfaces.
//! In the document this is a list entry with `linkToNode`/`linkToInterface` set; in the
//! graph it is a port whose `interface` flag is set.
//!
//! - [`apply_exports_from_model`] pushes a loaded document's derived interfaces down onto
//!   the matching node ports.
//! - [`collect_exports_to_model`] derives interface entries from exported ports.
//!
//! Collection is additive: it never removes descriptors whose port has since been
//! un-exported or deleted. [`clear_derived_interfaces`] drops every derived descriptor and
//! is only run when the caller asks for it, because clearing loses user-assigned export
//! names that no longer match a port.

use crate::document::{InterfaceDescriptor, ModelVersion};
use crate::graph::{ExportMode, GraphNode, PortDirection, PortInstance};
use tracing::{debug, trace};

/// Export name used for a port exported without an explicit name: `node:port`.
#[must_use]
pub fn auto_export_name(node_name: &str, port_name: &str) -> String {
  format!("{node_name}:{port_name}")
}

/// Marks the ports of `node` referenced by `version`'s derived interfaces as exported.
///
/// Returns the number of ports marked.
pub fn apply_exports_from_model(node: &mut GraphNode, version: &ModelVersion) -> usize {
  let mut marked = 0;
  let node_name = node.name.clone();
  let linked = version
    .interfaces
    .iter()
    .filter(|d| d.link_to_node.as_deref() == Some(node_name.as_str()));
  for descriptor in linked {
    let Some(port_name) = descriptor.link_to_interface.as_deref() else {
      continue;
    };
    let mut directions = Vec::with_capacity(2);
    if descriptor.direction.has_input() {
      directions.push(PortDirection::Input);
    }
    if descriptor.direction.has_output() {
      directions.push(PortDirection::Output);
    }
    for direction in directions {
      match node.port_mut(direction, port_name) {
        Some(port) => {
          mark_exported(port, &descriptor.name);
          marked += 1;
        }
        None => debug!(
          node = %node_name,
          port = %port_name,
          interface = %descriptor.name,
          "exported interface does not match a port"
        ),
      }
    }
  }
  marked
}

fn mark_exported(port: &mut PortInstance, export_name: &str) {
  port.interface = port.interface.max(ExportMode::Auto);
  port.interface_export_name = Some(export_name.to_string());
}

/// Builds the interface descriptor for one exported port of `node`.
#[must_use]
pub fn descriptor_for(node: &GraphNode, port: &PortInstance) -> InterfaceDescriptor {
  let name = port
    .interface_export_name
    .clone()
    .filter(|n| !n.is_empty())
    .unwrap_or_else(|| auto_export_name(&node.name, port.name()));
  let domain = if port.port.domain.is_empty() {
    node.model.domain.clone()
  } else {
    port.port.domain.clone()
  };
  InterfaceDescriptor {
    name,
    kind: port.port.kind.clone(),
    direction: port.port.direction.interface_direction(),
    domain,
    link_to_node: Some(node.name.clone()),
    link_to_interface: Some(port.name().to_string()),
    data: None,
  }
}

/// Appends a descriptor to `version` for every exported port of `node`.
///
/// A port already listed under the same name and link, in a direction covering the
/// port's side, is not appended again. Stale descriptors are never removed.
///
/// Returns the number appended.
pub fn collect_exports_to_model(node: &GraphNode, version: &mut ModelVersion) -> usize {
  let mut appended = 0;
  for port in node.all_ports().filter(|p| p.interface.is_exported()) {
    let descriptor = descriptor_for(node, port);
    let covers_direction = |d: &InterfaceDescriptor| match port.port.direction {
      PortDirection::Input => d.direction.has_input(),
      PortDirection::Output => d.direction.has_output(),
    };
    let present = version.interfaces.iter().any(|d| {
      d.name == descriptor.name
        && covers_direction(d)
        && d.link_to_node == descriptor.link_to_node
        && d.link_to_interface == descriptor.link_to_interface
    });
    if present {
      trace!(interface = %descriptor.name, "interface already listed");
      continue;
    }
    version.interfaces.push(descriptor);
    appended += 1;
  }
  appended
}

/// Removes every derived descriptor (those with `linkToNode`) from `version`.
///
/// Returns the number removed.
pub fn clear_derived_interfaces(version: &mut ModelVersion) -> usize {
  let before = version.interfaces.len();
  version.interfaces.retain(|d| !d.is_derived());
  before - version.interfaces.len()
}
