//! # sfumato_croquis
//!
//! Croquis - the template-to-script sketch.
//!
//! A template is turned into a script expression that a type checker can
//! follow: elements become helper calls, `v-for` an iteration callback,
//! `v-if` a conditional, event handlers functions taking `$event`. Template
//! expressions are kept as written, except that free identifiers are read
//! off the component instance (`foo` becomes `this.foo`).
//!
//! ## Architecture
//!
//! ```text
//! sfumato_armature (Parse)
//!        ↓
//!  sfumato_relief (AST)
//!        ↓
//!  sfumato_croquis (Transform + Print)  ← This crate
//!        ↓
//!  sfumato_canon (Materialize + Source Map)
//! ```
//!
//! Every node of the output tree that came from template text remembers its
//! span, which is what lets `sfumato_canon` map positions both ways after
//! the tree is printed.

pub mod builtins;
pub mod expr;
pub mod expression;
pub mod filters;
pub mod printer;
mod scope;
pub mod transform;

pub use expr::{ArrowBody, Expr, ExprKind, Fold, Literal, Property, PropertyKey, Stmt};
pub use expression::{
    inject_this, parse_expression, parse_params, parse_statements, ExpressionError,
};
pub use printer::{print_expr, print_statement_expr, THIS_DOT};
pub use scope::*;
pub use transform::{
    transform, COMPONENT_HELPER, HELPERS, ITERATION_HELPER, LISTENER_HELPER, RENDER_HELPER,
};
