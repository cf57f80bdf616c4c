//! # Layout Store
//!
//! Named snapshots of node positions plus a pointer to the current ("default") layout.
//!
//! Layouts travel inside a document's `data.gui` sub-tree:
//!
//! ```yaml
//! gui:
//!   defaultLayout: main
//!   layouts:
//!     main:
//!       source: { x: 10.0, y: 20.0 }
//! ```
//!
//! The store is flushed (the editor's current positions are saved under the current
//! layout name) before every layout switch and before every serialization, so unsaved
//! moves are never lost.

use crate::graph::GraphEditor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Key of the layout sub-tree inside a document's `data`.
pub const GUI_KEY: &str = "gui";

/// Layout name a fresh store points at.
pub const DEFAULT_LAYOUT_NAME: &str = "default";

/// Position and size of one node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeGeometry {
  /// Horizontal position.
  pub x: f64,
  /// Vertical position.
  pub y: f64,
  /// Width, when the editor tracks it.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub width: Option<f64>,
  /// Height, when the editor tracks it.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub height: Option<f64>,
}

impl NodeGeometry {
  /// A position without size.
  #[must_use]
  pub fn at(x: f64, y: f64) -> Self {
    Self {
      x,
      y,
      width: None,
      height: None,
    }
  }
}

/// Node name to geometry.
pub type LayoutSnapshot = BTreeMap<String, NodeGeometry>;

/// Serialized form of the `gui` sub-tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuiAnnotations {
  /// Named snapshots.
  #[serde(default)]
  pub layouts: BTreeMap<String, LayoutSnapshot>,
  /// Current layout name.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_layout: Option<String>,
}

/// Named layout snapshots with a current-layout pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutStore {
  layouts: BTreeMap<String, LayoutSnapshot>,
  default_layout: Option<String>,
}

impl Default for LayoutStore {
  fn default() -> Self {
    Self {
      layouts: BTreeMap::new(),
      default_layout: Some(DEFAULT_LAYOUT_NAME.to_string()),
    }
  }
}

impl LayoutStore {
  /// A store with no snapshots, pointing at [`DEFAULT_LAYOUT_NAME`].
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds a store from a document's `gui` sub-tree.
  #[must_use]
  pub fn from_annotations(annotations: GuiAnnotations) -> Self {
    Self {
      layouts: annotations.layouts,
      default_layout: annotations.default_layout,
    }
  }

  /// Builds a store from a raw `gui` value, falling back to an empty store when the value
  /// does not have the expected shape.
  #[must_use]
  pub fn from_value(value: serde_json::Value) -> Self {
    match serde_json::from_value::<GuiAnnotations>(value) {
      Ok(annotations) => Self::from_annotations(annotations),
      Err(e) => {
        warn!(error = %e, "ignoring malformed gui annotations");
        Self::new()
      }
    }
  }

  /// The `gui` sub-tree for this store.
  #[must_use]
  pub fn to_annotations(&self) -> GuiAnnotations {
    GuiAnnotations {
      layouts: self.layouts.clone(),
      default_layout: self.default_layout.clone(),
    }
  }

  /// Current layout name.
  #[must_use]
  pub fn default_layout(&self) -> Option<&str> {
    self.default_layout.as_deref()
  }

  /// Stored layout names, sorted.
  pub fn layout_names(&self) -> impl Iterator<Item = &str> {
    self.layouts.keys().map(String::as_str)
  }

  /// Snapshot stored under `name`.
  #[must_use]
  pub fn layout(&self, name: &str) -> Option<&LayoutSnapshot> {
    self.layouts.get(name)
  }

  /// Snapshot stored under the current layout name.
  #[must_use]
  pub fn current_snapshot(&self) -> Option<&LayoutSnapshot> {
    self.default_layout.as_deref().and_then(|name| self.layouts.get(name))
  }

  /// Saves the editor's current positions under the current layout name.
  ///
  /// No-op when there is no current layout.
  pub fn flush(&mut self, editor: &dyn GraphEditor) {
    if let Some(name) = &self.default_layout {
      let snapshot = editor.current_layout_snapshot();
      debug!(layout = %name, nodes = snapshot.len(), "flushing layout");
      self.layouts.insert(name.clone(), snapshot);
    }
  }

  /// Switches to layout `name`.
  ///
  /// Flushes under the previous name first, then applies the stored snapshot for `name`
  /// if there is one. Returns whether a snapshot was applied.
  pub fn select_layout(&mut self, name: &str, editor: &mut dyn GraphEditor) -> bool {
    self.flush(editor);
    self.default_layout = Some(name.to_string());
    self.apply_current(editor)
  }

  /// Hands the current snapshot to the editor. Returns whether one existed.
  pub fn apply_current(&self, editor: &mut dyn GraphEditor) -> bool {
    match self.current_snapshot() {
      Some(snapshot) => {
        editor.apply_layout_snapshot(snapshot);
        true
      }
      None => false,
    }
  }

  /// Stores `snapshot` under `name`, replacing any existing one.
  pub fn add_layout(&mut self, name: &str, snapshot: LayoutSnapshot) {
    self.layouts.insert(name.to_string(), snapshot);
  }

  /// Erases the snapshot under `name`; clears the pointer if it was current.
  ///
  /// Returns whether a snapshot was removed.
  pub fn remove_layout(&mut self, name: &str) -> bool {
    let removed = self.layouts.remove(name).is_some();
    if self.default_layout.as_deref() == Some(name) {
      self.default_layout = None;
    }
    removed
  }
}
