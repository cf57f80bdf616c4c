//! # Sub-document Codec
//!
//! Some levels of a component-model document hold sub-documents that may be stored
//! either as nested structure or as an embedded serialized string. This module normalizes
//! them:
//!
//! - [`unpack`] coerces every `data` field of a submodel tree to structure, so it can be
//!   edited.
//! - [`pack`] turns every structured `data` field back into the canonical embedded text
//!   (compact JSON, which every YAML parser also accepts).
//!
//! `pack(unpack(x))` reproduces `x` up to text formatting, and `unpack(pack(t))` reproduces
//! any structured tree `t`, string leaves included. Entries without `data` or
//! `submodel` are copied untouched. A malformed entry never aborts a pass: its `data` is
//! dropped and the problem is logged.
//!
//! Nested trees are rewritten with an explicit worklist, so depth is bounded by heap, not
//! by the call stack.

use crate::document::{NodeConfiguration, SubmodelEntry};
use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Canonical form used for sub-documents when writing a document.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubDocumentForm {
  /// Sub-documents are written as compact JSON text.
  #[default]
  Embedded,
  /// Sub-documents are written as nested structure.
  Structured,
}

/// Coerces a sub-document value to structure.
///
/// Strings are parsed as JSON, falling back to YAML; any other value is returned as is.
pub fn coerce_structured(name: &str, value: &Value) -> Result<Value, CodecError> {
  match value {
    Value::String(text) => {
      if let Ok(parsed) = serde_json::from_str(text) {
        return Ok(parsed);
      }
      serde_yaml::from_str(text).map_err(|source| CodecError::Parse {
        name: name.to_string(),
        source,
      })
    }
    other => Ok(other.clone()),
  }
}

/// Serializes a structured sub-document to its embedded text form.
///
/// `value` is taken as structure, so a string leaf is written quoted (`"123"` becomes
/// `"\"123\""`) and reads back as the same string.
pub fn to_embedded(name: &str, value: &Value) -> Result<Value, CodecError> {
  serde_json::to_string(value)
    .map(Value::String)
    .map_err(|source| CodecError::Serialize {
      name: name.to_string(),
      source,
    })
}

/// Returns an editable copy of `source` with every `data` field coerced to structure.
#[must_use]
pub fn unpack(source: &[SubmodelEntry]) -> Vec<SubmodelEntry> {
  rewrite_tree(source, coerce_structured)
}

/// Returns a copy of `source` with every `data` field serialized to embedded text.
#[must_use]
pub fn pack(source: &[SubmodelEntry]) -> Vec<SubmodelEntry> {
  rewrite_tree(source, to_embedded)
}

fn rewrite_tree(
  source: &[SubmodelEntry],
  rewrite: fn(&str, &Value) -> Result<Value, CodecError>,
) -> Vec<SubmodelEntry> {
  let mut target = source.to_vec();
  let mut pending: Vec<&mut SubmodelEntry> = target.iter_mut().collect();
  while let Some(entry) = pending.pop() {
    if let Some(data) = entry.data.take() {
      match rewrite(&entry.name, &data) {
        Ok(rewritten) => entry.data = Some(rewritten),
        Err(e) => warn!(entry = %entry.name, error = %e, "skipping sub-document"),
      }
    }
    pending.extend(entry.submodel.iter_mut());
  }
  target
}

/// Returns `configuration` with its `data` and `submodel` coerced to structure.
///
/// `owner` names the node in diagnostics.
#[must_use]
pub fn unpack_configuration(owner: &str, configuration: &NodeConfiguration) -> NodeConfiguration {
  let data = configuration
    .data
    .as_ref()
    .and_then(|data| match coerce_structured(owner, data) {
      Ok(structured) => Some(structured),
      Err(e) => {
        warn!(node = %owner, error = %e, "dropping malformed configuration data");
        None
      }
    });
  NodeConfiguration {
    data,
    submodel: unpack(&configuration.submodel),
  }
}

/// Returns `configuration` written in the requested canonical `form`.
///
/// `configuration` must already be structured, as it is once loaded into the graph.
#[must_use]
pub fn pack_configuration(
  owner: &str,
  configuration: &NodeConfiguration,
  form: SubDocumentForm,
) -> NodeConfiguration {
  match form {
    SubDocumentForm::Structured => configuration.clone(),
    SubDocumentForm::Embedded => {
      let data = configuration
        .data
        .as_ref()
        .and_then(|data| match to_embedded(owner, data) {
          Ok(text) => Some(text),
          Err(e) => {
            warn!(node = %owner, error = %e, "dropping unserializable configuration data");
            None
          }
        });
      NodeConfiguration {
        data,
        submodel: pack(&configuration.submodel),
      }
    }
  }
}

/// Writes a single structured sub-document value in the requested `form`, logging and
/// dropping it on failure.
#[must_use]
pub fn write_value(owner: &str, value: &Value, form: SubDocumentForm) -> Option<Value> {
  let written = match form {
    SubDocumentForm::Structured => Ok(value.clone()),
    SubDocumentForm::Embedded => to_embedded(owner, value),
  };
  match written {
    Ok(v) => Some(v),
    Err(e) => {
      warn!(owner = %owner, error = %e, "dropping sub-document");
      None
    }
  }
}

/// Reads a single sub-document value as structure, logging and dropping it on failure.
#[must_use]
pub fn read_value(owner: &str, value: &Value) -> Option<Value> {
  match coerce_structured(owner, value) {
    Ok(v) => Some(v),
    Err(e) => {
      warn!(owner = %owner, error = %e, "dropping malformed sub-document");
      None
    }
  }
}

/// Walks `path` through nested maps and returns the located sub-tree.
///
/// Returns `None` the first time a key is missing or an intermediate value is not a map.
/// Arrays are not traversed.
#[must_use]
pub fn get_sub_item<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
  let mut current = root;
  for (depth, key) in path.iter().enumerate() {
    let Some(map) = current.as_object() else {
      debug!(path = %path.join("."), depth, "sub-item parent is not a map");
      return None;
    };
    match map.get(*key) {
      Some(next) => current = next,
      None => {
        debug!(path = %path.join("."), key = %key, "sub-item key not found");
        return None;
      }
    }
  }
  Some(current)
}

/// Mutable variant of [`get_sub_item`].
pub fn get_sub_item_mut<'a>(root: &'a mut Value, path: &[&str]) -> Option<&'a mut Value> {
  let mut current = root;
  for key in path {
    current = match current {
      Value::Object(map) => match map.get_mut(*key) {
        Some(next) => next,
        None => {
          debug!(path = %path.join("."), key = %key, "sub-item key not found");
          return None;
        }
      },
      _ => {
        debug!(path = %path.join("."), "sub-item parent is not a map");
        return None;
      }
    };
  }
  Some(current)
}

/// Deep-merges `overlay` into `base`: objects merge key by key, every other value replaces.
pub fn merge_value(base: &mut Value, overlay: Value) {
  match (base, overlay) {
    (Value::Object(base_map), Value::Object(overlay_map)) => {
      for (key, value) in overlay_map {
        match base_map.get_mut(&key) {
          Some(existing) => merge_value(existing, value),
          None => {
            base_map.insert(key, value);
          }
        }
      }
    }
    (base, overlay) => *base = overlay,
  }
}
