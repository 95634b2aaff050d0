//! # Sfumato
//!
//! Language intelligence core for Vue single-file components, written in
//! Rust.
//!
//! This crate re-exports all Sfumato sub-crates for unified documentation.
//!
//! ## Crates
//!
//! - [`carton`] - Spans, line indexes and shared collections
//! - [`relief`] - Template AST definitions
//! - [`armature`] - Resumable HTML scanner and template parser
//! - [`atelier_sfc`] - Region extraction and virtual documents
//! - [`croquis`] - Template to script transformation
//! - [`canon`] - Materialization and source maps

/// Spans, line indexes and shared collections.
pub use sfumato_carton as carton;

/// Template AST definitions.
pub use sfumato_relief as relief;

/// Resumable HTML scanner and template parser.
pub use sfumato_armature as armature;

/// Region extraction and virtual documents.
pub use sfumato_atelier_sfc as atelier_sfc;

/// Template to script transformation.
pub use sfumato_croquis as croquis;

/// Materialization and source maps.
pub use sfumato_canon as canon;
