//! Lexical scope for template expressions.
//!
//! A [`Scope`] is a value: entering a `v-for`, a scoped slot or an event
//! handler produces a new scope with more names, and the enclosing one is
//! left untouched. Identifiers found in scope stay bare; everything else is
//! read off the component instance.

use sfumato_carton::String;

use crate::builtins::{is_template_global, EVENT_LOCALS};

/// Names visible to a template expression
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    /// Whether the runtime global allow-list is in scope
    globals: bool,
    /// Names introduced by enclosing constructs, outermost first
    names: Vec<String>,
}

impl Scope {
    /// A scope with nothing in it, not even the runtime globals.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The scope a template root starts with: the runtime globals plus any
    /// extra names the caller declares (plugin globals such as `$t`).
    pub fn template_root<I, S>(extra_globals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            globals: true,
            names: extra_globals
                .into_iter()
                .map(|name| String::new(name.as_ref()))
                .collect(),
        }
    }

    /// Return a new scope with `names` pushed on top of this one.
    #[must_use]
    pub fn extend<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut next = self.clone();
        next.names
            .extend(names.into_iter().map(|name| String::new(name.as_ref())));
        next
    }

    /// Scope of an event handler body: `$event` and `arguments` are bound.
    #[must_use]
    pub fn with_event_locals(&self) -> Self {
        self.extend(EVENT_LOCALS)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().rev().any(|n| n.as_str() == name) || (self.globals && is_template_global(name))
    }

    /// Names introduced by enclosing constructs, outermost first.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
