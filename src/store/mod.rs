//! Model store boundary.
//!
//! A model store fetches and persists [`ComponentModelDocument`]s by `(domain, name,
//! version)`. Calls are blocking; retries, timeouts and caching are the store's business.
//!
//! Two implementations ship with the crate: [`MemoryModelStore`] and [`FileModelStore`].

use crate::document::ComponentModelDocument;
use crate::error::StoreError;

pub mod file;
pub mod memory;

pub use file::FileModelStore;
pub use memory::MemoryModelStore;

/// A stored model as reported by [`ModelStore::list_models`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModelSummary {
  /// Model name.
  pub name: String,
  /// Model kind, if the document declares one.
  pub kind: Option<String>,
}

/// Persistent storage of component models.
pub trait ModelStore {
  /// Fetches the model stored under `(domain, name)`.
  ///
  /// With `limit_to_version` the returned document carries only `version`, or no version
  /// at all when that version does not exist.
  ///
  /// # Errors
  ///
  /// Returns [`StoreError::NotFound`] when no such model is stored, or a backend error.
  fn fetch_model(
    &self,
    domain: &str,
    name: &str,
    version: &str,
    limit_to_version: bool,
  ) -> Result<ComponentModelDocument, StoreError>;

  /// Stores `document`, merging its versions into any stored document of the same
  /// identity (same version strings are replaced).
  ///
  /// # Errors
  ///
  /// Returns a backend error if the document cannot be written.
  fn store_model(&mut self, document: &ComponentModelDocument) -> Result<(), StoreError>;

  /// Models stored in `domain`, sorted by name.
  ///
  /// # Errors
  ///
  /// Returns a backend error if the listing fails.
  fn list_models(&self, domain: &str) -> Result<Vec<ModelSummary>, StoreError>;

  /// Version strings stored for `(domain, name)`, oldest first.
  ///
  /// # Errors
  ///
  /// Returns [`StoreError::NotFound`] when no such model is stored.
  fn list_versions(&self, domain: &str, name: &str) -> Result<Vec<String>, StoreError>;
}

/// Merges `incoming` versions into `stored`.
pub(crate) fn merge_versions(stored: &mut ComponentModelDocument, incoming: &ComponentModelDocument) {
  if incoming.kind.is_some() {
    stored.kind = incoming.kind.clone();
  }
  for version in &incoming.versions {
    stored.upsert_version(version.clone());
  }
}
