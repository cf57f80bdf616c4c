//! # ModelWeave
//!
//! Bidirectional synchronization between persisted, versioned component-model documents
//! and a live, editable graph of component instances.
//!
//! ModelWeave loads a document into a graph editor (instantiating node types on demand,
//! wiring edges, applying configuration, exports and layout) and rebuilds the document
//! from whatever the graph looks like after editing.
//!
//! ## Key Features
//!
//! - **Lazy Type Registry**: node templates are built from stored models the first time a
//!   type is referenced, then served from a shared cache
//! - **Round-Trip Safe**: node names stay stable across renames, sub-documents survive
//!   pack/unpack, duplicate edges are rejected
//! - **Best-Effort Loading**: unresolvable nodes and bad edges are skipped and reported,
//!   never fatal
//! - **Named Layouts**: position snapshots stored alongside the model
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use modelweave::config::SessionConfig;
//! use modelweave::graph::Graph;
//! use modelweave::session::ModelSession;
//! use modelweave::store::FileModelStore;
//!
//! let config = SessionConfig::default().with_store_root("models");
//! let mut session = ModelSession::new(config, FileModelStore::new("models"), Graph::new("main"));
//! let report = session.open("dsp", "Chain", "1")?;
//! assert!(report.is_complete());
//! session.rename_node("filter", "Low pass")?;
//! assert!(session.save());
//! # Ok::<(), modelweave::error::SessionError>(())
//! ```

// Documentation enforcement - treat missing docs as errors
#![deny(missing_docs)]

/// Session configuration.
pub mod config;
/// Component-model document types and codec.
pub mod document;
/// Error types.
pub mod error;
/// Live graph model and the editor boundary.
pub mod graph;
/// Exported-interface derivation.
pub mod interface;
/// Named layout snapshots.
pub mod layout;
/// Document to graph loading.
pub mod loader;
/// Tracing subscriber setup.
pub mod logging;
/// Mermaid diagram export.
pub mod mermaid;
/// Lazy node template cache.
pub mod registry;
/// Graph to document serialization.
pub mod serializer;
/// Editing session facade.
pub mod session;
/// Model store boundary and implementations.
pub mod store;
/// Sub-document pack/unpack helpers.
pub mod submodel;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod serializer_test;
