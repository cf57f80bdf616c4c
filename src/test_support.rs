//! Shared fixtures for unit tests.

use crate::document::{
  ComponentModelDocument, Direction, EdgeRef, Endpoint, InterfaceDescriptor, ModelRef,
  ModelVersion, NodeRef,
};
use crate::error::StoreError;
use crate::store::{MemoryModelStore, ModelStore, ModelSummary};
use std::cell::Cell;

/// A memory store that counts `fetch_model` calls.
#[derive(Default)]
pub struct CountingStore {
  pub inner: MemoryModelStore,
  pub fetches: Cell<usize>,
}

impl CountingStore {
  pub fn new(inner: MemoryModelStore) -> Self {
    Self {
      inner,
      fetches: Cell::new(0),
    }
  }
}

impl ModelStore for CountingStore {
  fn fetch_model(
    &self,
    domain: &str,
    name: &str,
    version: &str,
    limit_to_version: bool,
  ) -> Result<ComponentModelDocument, StoreError> {
    self.fetches.set(self.fetches.get() + 1);
    self.inner.fetch_model(domain, name, version, limit_to_version)
  }

  fn store_model(&mut self, document: &ComponentModelDocument) -> Result<(), StoreError> {
    self.inner.store_model(document)
  }

  fn list_models(&self, domain: &str) -> Result<Vec<ModelSummary>, StoreError> {
    self.inner.list_models(domain)
  }

  fn list_versions(&self, domain: &str, name: &str) -> Result<Vec<String>, StoreError> {
    self.inner.list_versions(domain, name)
  }
}

pub fn interface(name: &str, kind: &str, direction: Direction) -> InterfaceDescriptor {
  InterfaceDescriptor {
    name: name.to_string(),
    kind: kind.to_string(),
    direction,
    domain: "dom".to_string(),
    ..InterfaceDescriptor::default()
  }
}

pub fn exported(name: &str, direction: Direction, node: &str, port: &str) -> InterfaceDescriptor {
  InterfaceDescriptor {
    link_to_node: Some(node.to_string()),
    link_to_interface: Some(port.to_string()),
    ..interface(name, "float", direction)
  }
}

/// An atomic model with a single version.
pub fn atomic_model(
  name: &str,
  version: &str,
  interfaces: Vec<InterfaceDescriptor>,
) -> ComponentModelDocument {
  let mut document = ComponentModelDocument::new("dom", name);
  document.kind = Some("atomic".to_string());
  let mut v = ModelVersion::new(version);
  v.interfaces = interfaces;
  document.versions.push(v);
  document
}

/// `dom::T::v1` (output `out1`) and `dom::Sink::v1` (input `in1`).
pub fn source_sink_store() -> MemoryModelStore {
  MemoryModelStore::new()
    .with_model(atomic_model(
      "T",
      "v1",
      vec![interface("out1", "float", Direction::Outgoing)],
    ))
    .with_model(atomic_model(
      "Sink",
      "v1",
      vec![interface("in1", "float", Direction::Incoming)],
    ))
}

pub fn node_ref(name: &str, model: &str) -> NodeRef {
  NodeRef {
    name: name.to_string(),
    model: ModelRef::new("dom", model, "v1"),
    ..NodeRef::default()
  }
}

pub fn edge_ref(from: (&str, &str), to: (&str, &str)) -> EdgeRef {
  EdgeRef {
    name: None,
    from: Endpoint::new(from.0, from.1),
    to: Endpoint::new(to.0, to.1),
    data: None,
  }
}

/// Composite `dom::Chain` version `1`: `A` (`dom::T::v1`) feeding `B` (`dom::Sink::v1`),
/// with `A.out1` exported as `ifaceA`.
pub fn chain_document() -> ComponentModelDocument {
  let mut document = ComponentModelDocument::new("dom", "Chain");
  document.kind = Some("composite".to_string());
  let mut version = ModelVersion::new("1");
  version
    .interfaces
    .push(exported("ifaceA", Direction::Outgoing, "A", "out1"));
  version.components.nodes = vec![node_ref("A", "T"), node_ref("B", "Sink")];
  version.components.edges = vec![edge_ref(("A", "out1"), ("B", "in1"))];
  document.versions.push(version);
  document
}
