//! Session configuration.
//!
//! Loaded from YAML; every field has a default, so an empty file is a valid config:
//!
//! ```yaml
//! search_paths: [./models/local]
//! store_root: ./models
//! sub_document_form: embedded
//! clear_derived_interfaces_on_save: false
//! log_filter: info
//! ```

use crate::error::ConfigError;
use crate::serializer::SerializeOptions;
use crate::submodel::SubDocumentForm;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_log_filter() -> String {
  "info".to_string()
}

/// Settings for a [`ModelSession`](crate::session::ModelSession).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SessionConfig {
  /// Directories scanned for local model documents when the registry is created.
  pub search_paths: Vec<PathBuf>,
  /// Root of the file-backed model store.
  pub store_root: Option<PathBuf>,
  /// Form used for configuration sub-documents on save.
  pub sub_document_form: SubDocumentForm,
  /// Drop every derived interface before re-collecting exports on save.
  pub clear_derived_interfaces_on_save: bool,
  /// `tracing` filter used when `RUST_LOG` is unset.
  #[serde(default = "default_log_filter")]
  pub log_filter: String,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      search_paths: Vec::new(),
      store_root: None,
      sub_document_form: SubDocumentForm::default(),
      clear_derived_interfaces_on_save: false,
      log_filter: default_log_filter(),
    }
  }
}

impl SessionConfig {
  /// Reads a configuration file.
  ///
  /// # Errors
  ///
  /// Fails if the file cannot be read or is not valid YAML for this schema.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    Self::from_yaml_str(&text)
  }

  /// Parses a configuration from YAML text. Empty text yields the defaults.
  ///
  /// # Errors
  ///
  /// Fails if the text is not valid YAML for this schema.
  pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
    if text.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(text)?)
  }

  /// Adds a template search path.
  #[must_use]
  pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.search_paths.push(path.into());
    self
  }

  /// Sets the file store root.
  #[must_use]
  pub fn with_store_root(mut self, root: impl Into<PathBuf>) -> Self {
    self.store_root = Some(root.into());
    self
  }

  /// Sets the sub-document write form.
  #[must_use]
  pub fn with_sub_document_form(mut self, form: SubDocumentForm) -> Self {
    self.sub_document_form = form;
    self
  }

  /// Enables or disables clearing derived interfaces on save.
  #[must_use]
  pub fn with_clear_derived_interfaces_on_save(mut self, clear: bool) -> Self {
    self.clear_derived_interfaces_on_save = clear;
    self
  }

  /// Sets the log filter.
  #[must_use]
  pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
    self.log_filter = filter.into();
    self
  }

  /// Serializer options derived from this configuration.
  #[must_use]
  pub fn serialize_options(&self) -> SerializeOptions {
    SerializeOptions::default()
      .with_clear_derived_interfaces(self.clear_derived_interfaces_on_save)
      .with_sub_document_form(self.sub_document_form)
  }
}
