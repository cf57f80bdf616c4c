//! File-backed model store.
//!
//! Each model lives in `<root>/<domain>/<name>.yaml` and holds every version of the model.
//! Reads also accept `<name>.yml` and `<name>.json`, in that order of preference after
//! `.yaml`; writes always go to `.yaml`.

use super::{ModelStore, ModelSummary, merge_versions};
use crate::document::ComponentModelDocument;
use crate::error::StoreError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const READ_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// A model store rooted at a directory.
#[derive(Clone, Debug)]
pub struct FileModelStore {
  root: PathBuf,
}

impl FileModelStore {
  /// A store rooted at `root`. The directory is created on first write.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// The store's root directory.
  #[must_use]
  pub fn root(&self) -> &Path {
    &self.root
  }

  fn domain_dir(&self, domain: &str) -> Result<PathBuf, StoreError> {
    validate_identifier(domain)?;
    Ok(self.root.join(domain))
  }

  fn existing_path(&self, domain: &str, name: &str) -> Result<Option<PathBuf>, StoreError> {
    validate_identifier(name)?;
    let dir = self.domain_dir(domain)?;
    Ok(
      READ_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{name}.{ext}")))
        .find(|path| path.is_file()),
    )
  }

  fn read(&self, domain: &str, name: &str) -> Result<ComponentModelDocument, StoreError> {
    let path = self
      .existing_path(domain, name)?
      .ok_or_else(|| StoreError::NotFound {
        domain: domain.to_string(),
        name: name.to_string(),
      })?;
    read_document(&path)
  }
}

fn read_document(path: &Path) -> Result<ComponentModelDocument, StoreError> {
  let text = std::fs::read_to_string(path)?;
  ComponentModelDocument::parse(&text).map_err(|source| StoreError::Document {
    path: path.to_path_buf(),
    source,
  })
}

fn validate_identifier(identifier: &str) -> Result<(), StoreError> {
  let invalid = identifier.is_empty()
    || identifier == "."
    || identifier == ".."
    || identifier.contains(['/', '\\']);
  if invalid {
    Err(StoreError::InvalidIdentifier(identifier.to_string()))
  } else {
    Ok(())
  }
}

impl ModelStore for FileModelStore {
  fn fetch_model(
    &self,
    domain: &str,
    name: &str,
    version: &str,
    limit_to_version: bool,
  ) -> Result<ComponentModelDocument, StoreError> {
    let document = self.read(domain, name)?;
    debug!(domain, name, version, limit_to_version, "fetched model");
    Ok(if limit_to_version {
      document.limited_to(version)
    } else {
      document
    })
  }

  fn store_model(&mut self, document: &ComponentModelDocument) -> Result<(), StoreError> {
    let dir = self.domain_dir(&document.domain)?;
    let mut stored = match self.read(&document.domain, &document.name) {
      Ok(stored) => stored,
      Err(StoreError::NotFound { .. }) => {
        ComponentModelDocument::new(&document.domain, &document.name)
      }
      Err(e) => return Err(e),
    };
    merge_versions(&mut stored, document);

    std::fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{}.yaml", document.name));
    let text = stored
      .to_yaml_string()
      .map_err(|source| StoreError::Document {
        path: path.clone(),
        source,
      })?;
    std::fs::write(&path, text)?;
    debug!(path = %path.display(), versions = stored.versions.len(), "stored model");
    Ok(())
  }

  fn list_models(&self, domain: &str) -> Result<Vec<ModelSummary>, StoreError> {
    let dir = self.domain_dir(domain)?;
    if !dir.is_dir() {
      return Ok(Vec::new());
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)?
      .filter_map(Result::ok)
      .map(|entry| entry.path())
      .filter(|path| {
        path
          .extension()
          .and_then(|ext| ext.to_str())
          .is_some_and(|ext| READ_EXTENSIONS.contains(&ext))
      })
      .collect();
    paths.sort();

    let mut models: Vec<ModelSummary> = Vec::new();
    for path in paths {
      match read_document(&path) {
        Ok(document) if !models.iter().any(|m| m.name == document.name) => {
          models.push(ModelSummary {
            name: document.name,
            kind: document.kind,
          });
        }
        Ok(_) => {}
        Err(e) => warn!(file = %path.display(), error = %e, "skipping unreadable model"),
      }
    }
    models.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(models)
  }

  fn list_versions(&self, domain: &str, name: &str) -> Result<Vec<String>, StoreError> {
    Ok(
      self
        .read(domain, name)?
        .versions
        .into_iter()
        .map(|v| v.version)
        .collect(),
    )
  }
}
