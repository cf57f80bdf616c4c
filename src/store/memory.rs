//! In-process model store.

use super::{ModelStore, ModelSummary, merge_versions};
use crate::document::ComponentModelDocument;
use crate::error::StoreError;
use std::collections::BTreeMap;

/// A model store backed by a map, keyed by `(domain, name)`.
#[derive(Clone, Debug, Default)]
pub struct MemoryModelStore {
  models: BTreeMap<(String, String), ComponentModelDocument>,
}

impl MemoryModelStore {
  /// An empty store.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds or merges `document`, builder style.
  #[must_use]
  pub fn with_model(mut self, document: ComponentModelDocument) -> Self {
    self.insert(document);
    self
  }

  /// Adds or merges `document`.
  pub fn insert(&mut self, document: ComponentModelDocument) {
    let key = (document.domain.clone(), document.name.clone());
    match self.models.get_mut(&key) {
      Some(stored) => merge_versions(stored, &document),
      None => {
        self.models.insert(key, document);
      }
    }
  }

  /// Number of stored models.
  #[must_use]
  pub fn len(&self) -> usize {
    self.models.len()
  }

  /// Whether the store is empty.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.models.is_empty()
  }

  fn get(&self, domain: &str, name: &str) -> Result<&ComponentModelDocument, StoreError> {
    self
      .models
      .get(&(domain.to_string(), name.to_string()))
      .ok_or_else(|| StoreError::NotFound {
        domain: domain.to_string(),
        name: name.to_string(),
      })
  }
}

impl ModelStore for MemoryModelStore {
  fn fetch_model(
    &self,
    domain: &str,
    name: &str,
    version: &str,
    limit_to_version: bool,
  ) -> Result<ComponentModelDocument, StoreError> {
    let document = self.get(domain, name)?;
    Ok(if limit_to_version {
      document.limited_to(version)
    } else {
      document.clone()
    })
  }

  fn store_model(&mut self, document: &ComponentModelDocument) -> Result<(), StoreError> {
    self.insert(document.clone());
    Ok(())
  }

  fn list_models(&self, domain: &str) -> Result<Vec<ModelSummary>, StoreError> {
    Ok(
      self
        .models
        .iter()
        .filter(|((d, _), _)| d == domain)
        .map(|((_, name), document)| ModelSummary {
          name: name.clone(),
          kind: document.kind.clone(),
        })
        .collect(),
    )
  }

  fn list_versions(&self, domain: &str, name: &str) -> Result<Vec<String>, StoreError> {
    Ok(
      self
        .get(domain, name)?
        .versions
        .iter()
        .map(|v| v.version.clone())
        .collect(),
    )
  }
}
