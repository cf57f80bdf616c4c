//! Export a component model to a Mermaid (`.mmd`) flowchart.
//!
//! Each contained node is drawn as a subgraph holding one box per used port plus a core
//! box; the model's interfaces are drawn as external nodes outside any subgraph. Derived
//! interfaces are connected to the port they were exported from.
//!
//! The diagram starts with a `%% model:` comment block naming the model and listing the
//! exported interfaces, so the text stays readable without rendering.

use crate::document::{ComponentModelDocument, Direction, InterfaceDescriptor, ModelVersion};
use crate::error::ExportError;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Replaces every character that is not ASCII alphanumeric or `_` with `_`.
#[must_use]
pub fn safe_id(name: &str) -> String {
  let safe: String = name
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
    .collect();
  if safe.is_empty() {
    "_".to_string()
  } else {
    safe
  }
}

fn quoted(label: &str) -> String {
  label.replace('"', "#quot;")
}

fn port_id(node: &str, side: &str, port: &str) -> String {
  format!("{}_{}_{}", safe_id(node), side, safe_id(port))
}

fn interface_id(interface: &InterfaceDescriptor) -> String {
  format!("if_{}", safe_id(&interface.name))
}

#[derive(Default)]
struct NodePorts {
  inputs: BTreeSet<String>,
  outputs: BTreeSet<String>,
}

/// Renders one model version as a Mermaid flowchart.
#[must_use]
pub fn version_to_mermaid(version: &ModelVersion) -> String {
  let mut out = String::new();
  out.push_str(&format!("%% model: version {}\n", version.version));
  for interface in &version.interfaces {
    match (&interface.link_to_node, &interface.link_to_interface) {
      (Some(node), Some(port)) => {
        out.push_str(&format!(
          "%% model: interface {} {:?} <-> {}.{}\n",
          interface.name, interface.direction, node, port
        ));
      }
      _ => {
        out.push_str(&format!(
          "%% model: interface {} {:?}\n",
          interface.name, interface.direction
        ));
      }
    }
  }
  out.push_str("flowchart TD\n");

  let components = &version.components;
  let mut ports: BTreeMap<&str, NodePorts> = components
    .nodes
    .iter()
    .map(|node| (node.name.as_str(), NodePorts::default()))
    .collect();
  for edge in &components.edges {
    if let Some(p) = ports.get_mut(edge.from.name.as_str()) {
      p.outputs.insert(edge.from.interface.clone());
    }
    if let Some(p) = ports.get_mut(edge.to.name.as_str()) {
      p.inputs.insert(edge.to.interface.clone());
    }
  }
  for interface in &version.interfaces {
    let (Some(node), Some(port)) = (&interface.link_to_node, &interface.link_to_interface) else {
      continue;
    };
    if let Some(p) = ports.get_mut(node.as_str()) {
      if interface.direction.has_input() {
        p.inputs.insert(port.clone());
      }
      if interface.direction.has_output() {
        p.outputs.insert(port.clone());
      }
    }
  }

  for interface in &version.interfaces {
    out.push_str(&format!(
      "  {}([\"{}\"])\n",
      interface_id(interface),
      quoted(&interface.name)
    ));
  }
  out.push('\n');

  let no_ports = NodePorts::default();
  for node in &components.nodes {
    let id = safe_id(&node.name);
    let label = node.alias.as_deref().unwrap_or(&node.name);
    let core = format!("{id}_core");
    out.push_str(&format!("  subgraph {id}[\"{}\"]\n", quoted(label)));
    out.push_str("    direction LR\n");
    let node_ports = ports.get(node.name.as_str()).unwrap_or(&no_ports);
    for p in &node_ports.inputs {
      out.push_str(&format!("    {}[\"{}\"]\n", port_id(&node.name, "in", p), quoted(p)));
    }
    out.push_str(&format!(
      "    {core}[\"{}<br/>{}\"]\n",
      quoted(&node.name),
      quoted(&node.model.type_key())
    ));
    for p in &node_ports.outputs {
      out.push_str(&format!("    {}[\"{}\"]\n", port_id(&node.name, "out", p), quoted(p)));
    }
    for p in &node_ports.inputs {
      out.push_str(&format!("    {} --> {core}\n", port_id(&node.name, "in", p)));
    }
    for p in &node_ports.outputs {
      out.push_str(&format!("    {core} --> {}\n", port_id(&node.name, "out", p)));
    }
    out.push_str("  end\n\n");
  }

  for interface in &version.interfaces {
    let (Some(node), Some(port)) = (&interface.link_to_node, &interface.link_to_interface) else {
      continue;
    };
    let external = interface_id(interface);
    if matches!(interface.direction, Direction::Incoming | Direction::Bidirectional) {
      out.push_str(&format!("  {external} --> {}\n", port_id(node, "in", port)));
    }
    if matches!(interface.direction, Direction::Outgoing | Direction::Bidirectional) {
      out.push_str(&format!("  {} --> {external}\n", port_id(node, "out", port)));
    }
  }
  for edge in &components.edges {
    let arrow = if edge_is_decoupled(edge.data.as_ref()) {
      "-.->"
    } else {
      "-->"
    };
    out.push_str(&format!(
      "  {} {arrow} {}\n",
      port_id(&edge.from.name, "out", &edge.from.interface),
      port_id(&edge.to.name, "in", &edge.to.interface)
    ));
  }
  out
}

fn edge_is_decoupled(data: Option<&serde_json::Value>) -> bool {
  data
    .and_then(|d| d.get(crate::loader::DECOUPLE_KEY))
    .and_then(serde_json::Value::as_bool)
    .unwrap_or(false)
}

/// Renders the active version of `document`, prefixed with the model's type key.
///
/// # Errors
///
/// Returns [`ExportError::NoVersion`] if the document has no version.
pub fn document_to_mermaid(document: &ComponentModelDocument) -> Result<String, ExportError> {
  let version = document
    .active_version()
    .ok_or_else(|| ExportError::NoVersion(document.name.clone()))?;
  let mut out = format!(
    "%% model: {}\n",
    document.model_ref(&version.version).type_key()
  );
  out.push_str(&version_to_mermaid(version));
  Ok(out)
}

/// Writes the diagram for `document` to `path`.
///
/// # Errors
///
/// Fails if the document has no version or the file cannot be written.
pub fn write_mermaid(path: &Path, document: &ComponentModelDocument) -> Result<(), ExportError> {
  let mmd = document_to_mermaid(document)?;
  std::fs::write(path, mmd)?;
  Ok(())
}
