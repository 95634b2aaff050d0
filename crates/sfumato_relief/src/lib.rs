//! Relief - The sculptured AST surface for sfumato templates.
//!
//! Node types produced by the template parser in `sfumato_armature` and
//! consumed by the expression transformer in `sfumato_croquis`. Every node
//! carries its byte span in the template text it was parsed from.

pub mod ast;
pub mod errors;

pub use ast::*;
pub use errors::*;
