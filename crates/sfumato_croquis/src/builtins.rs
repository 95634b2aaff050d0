//! Runtime globals reachable from template expressions.
//!
//! A template expression is evaluated against the component instance, so a
//! free identifier normally means `this.name`. The names below are the
//! exceptions: they resolve to the JavaScript global of the same name.
//!
//! Uses compile-time perfect hash functions (phf) for O(1) lookup
//! with zero runtime initialization cost.

use phf::phf_set;

/// Globals a template may reference directly.
static TEMPLATE_GLOBALS_SET: phf::Set<&'static str> = phf_set! {
    // ES values
    "Infinity",
    "undefined",
    "NaN",
    // Global functions
    "isFinite",
    "isNaN",
    "parseFloat",
    "parseInt",
    "decodeURI",
    "decodeURIComponent",
    "encodeURI",
    "encodeURIComponent",
    // Built-in constructors and namespaces
    "Math",
    "Number",
    "Date",
    "Array",
    "Object",
    "Boolean",
    "String",
    "RegExp",
    "Map",
    "Set",
    "JSON",
    "Intl",
    // Module system
    "require",
};

/// Check if a name is a runtime global allowed in templates.
#[inline]
pub fn is_template_global(name: &str) -> bool {
    TEMPLATE_GLOBALS_SET.contains(name)
}

/// Names implicitly bound inside an event handler body, in declaration order.
pub const EVENT_LOCALS: [&str; 2] = ["$event", "arguments"];
