//! Template to script transformation.
//!
//! The output is never run. It only has to type-check the way the template
//! would behave at runtime, so elements become calls to typed helpers and
//! directives become the control flow they stand for:
//!
//! ```text
//! <li v-for="item in items" :key="item.id">{{ item.name }}</li>
//!
//! __vlsIterationHelper(this.items, (item) =>
//!   __vlsComponentHelper('li', { props: { 'key': item.id }, on: {}, directives: [] }, [item.name]))
//! ```
//!
//! Directive values that do not parse are logged and replaced with `''`,
//! so one bad attribute never costs the rest of the template.

use once_cell::sync::Lazy;
use regex::Regex;
use sfumato_carton::SourceRange;
use sfumato_relief::{
    DirectiveArg, DirectiveNode, ElementNode, PropNode, RootNode, SimpleExpressionNode,
    TemplateChildNode,
};

use crate::expr::{Expr, ExprKind, Literal, Property, PropertyKey, Stmt};
use crate::expression::{
    inject_this, inject_this_stmt, parse_expression, parse_params, parse_statements,
    pattern_names, ExpressionError,
};
use crate::filters::{split_filters, FilterSequence, Segment};
use crate::scope::Scope;

pub const RENDER_HELPER: &str = "__vlsRenderHelper";
pub const COMPONENT_HELPER: &str = "__vlsComponentHelper";
pub const ITERATION_HELPER: &str = "__vlsIterationHelper";
pub const LISTENER_HELPER: &str = "__vlsListenerHelper";

/// Every helper the materialized program imports, in import order.
pub const HELPERS: [&str; 4] = [
    RENDER_HELPER,
    COMPONENT_HELPER,
    ITERATION_HELPER,
    LISTENER_HELPER,
];

/// `alias in expr` / `alias of expr`
static FOR_ALIAS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\s\S]*?)\s+(?:in|of)\s+([\s\S]*)$").expect("valid regex"));

/// A method path: `onClick`, `handlers.save`, `map['key']`
static SIMPLE_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*|\['[^']*?'\]|\["[^"]*?"\]|\[\d+\]|\[[A-Za-z_$][\w$]*\])*$"#,
    )
    .expect("valid regex")
});

/// A function expression: `e => ...`, `(a, b) => ...`, `function (...`
static FUNCTION_EXPRESSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[\w$]+|\([^)]*?\))\s*=>|^function\s*\(").expect("valid regex")
});

/// Transform the children of `root` into one expression each.
///
/// `source` is the text the template was parsed from; every span in the
/// output points into it. `scope` is usually [`Scope::template_root`].
pub fn transform(root: &RootNode, source: &str, scope: &Scope) -> Vec<Expr> {
    Transformer { source }.children(&root.children, scope)
}

/// Whether an event handler value is used as the handler itself rather than
/// run as statements.
pub fn is_handler_expression(value: &str) -> bool {
    let value = value.trim();
    SIMPLE_PATH_RE.is_match(value) || FUNCTION_EXPRESSION_RE.is_match(value)
}

/// The empty string standing in for a blank value at `offset`.
fn placeholder(offset: u32) -> Expr {
    Expr::with_span(
        ExprKind::Literal(Literal::String(Default::default())),
        SourceRange::empty(offset),
    )
}

fn static_key(name: &str) -> PropertyKey {
    PropertyKey::Static(Expr::identifier(name))
}

fn string_key(name: &str) -> PropertyKey {
    PropertyKey::Static(Expr::string(name))
}

fn key_value(key: PropertyKey, value: Expr) -> Property {
    Property::KeyValue {
        key,
        value,
        shorthand: false,
    }
}

// ============================================================================
// Pre-transform
// ============================================================================

/// A child with its structural directives pulled out, outermost first
enum Planned<'a> {
    Slot {
        directive: &'a DirectiveNode,
        inner: Box<Planned<'a>>,
    },
    For {
        directive: &'a DirectiveNode,
        inner: Box<Planned<'a>>,
    },
    If(Branch<'a>),
    Node(&'a TemplateChildNode),
}

/// One arm of a `v-if` / `v-else-if` / `v-else` chain
struct Branch<'a> {
    directive: &'a DirectiveNode,
    inner: Box<Planned<'a>>,
    next: Option<Box<Branch<'a>>>,
}

/// Structural directives already applied to an element
#[derive(Clone, Copy, Default)]
struct Applied {
    slot: bool,
    for_: bool,
    if_: bool,
}

struct Planner<'a> {
    queue: Vec<&'a TemplateChildNode>,
    next: usize,
}

impl<'a> Planner<'a> {
    fn new(children: &'a [TemplateChildNode]) -> Self {
        let queue = children
            .iter()
            .filter(|child| {
                !child.is_whitespace_text() && !matches!(child, TemplateChildNode::Comment(_))
            })
            .collect();
        Self { queue, next: 0 }
    }

    fn plan(mut self) -> Vec<Planned<'a>> {
        let mut planned = Vec::with_capacity(self.queue.len());
        while let Some(&child) = self.queue.get(self.next) {
            self.next += 1;
            planned.push(match child {
                TemplateChildNode::Element(el) => self.element(child, el, Applied::default()),
                _ => Planned::Node(child),
            });
        }
        planned
    }

    fn element(
        &mut self,
        child: &'a TemplateChildNode,
        el: &'a ElementNode,
        applied: Applied,
    ) -> Planned<'a> {
        if !applied.slot {
            if let Some(directive) = el.find_directive(&["slot", "slot-scope"]) {
                let applied = Applied {
                    slot: true,
                    ..applied
                };
                return Planned::Slot {
                    directive,
                    inner: Box::new(self.element(child, el, applied)),
                };
            }
        }

        // v-for binds tighter than v-if on the same element
        if !applied.for_ {
            if let Some(directive) = el.find_directive(&["for"]) {
                let applied = Applied {
                    for_: true,
                    ..applied
                };
                return Planned::For {
                    directive,
                    inner: Box::new(self.element(child, el, applied)),
                };
            }
        }

        if !applied.if_ {
            if let Some(directive) = el.find_directive(&["if"]) {
                let applied = Applied {
                    if_: true,
                    ..applied
                };
                let inner = Box::new(self.element(child, el, applied));
                return Planned::If(Branch {
                    directive,
                    inner,
                    next: self.follow_if(),
                });
            }
        }

        Planned::Node(child)
    }

    /// Consume the next sibling if it continues a `v-if` chain.
    fn follow_if(&mut self) -> Option<Box<Branch<'a>>> {
        let child = *self.queue.get(self.next)?;
        let el = child.as_element()?;
        let directive = el
            .find_directive(&["else-if"])
            .or_else(|| el.find_directive(&["else"]))?;

        self.next += 1;
        let inner = Box::new(self.element(
            child,
            el,
            Applied {
                if_: true,
                ..Applied::default()
            },
        ));
        Some(Box::new(Branch {
            directive,
            inner,
            next: self.follow_if(),
        }))
    }
}

// ============================================================================
// Transform
// ============================================================================

struct Transformer<'s> {
    source: &'s str,
}

impl Transformer<'_> {
    fn children(&self, children: &[TemplateChildNode], scope: &Scope) -> Vec<Expr> {
        Planner::new(children)
            .plan()
            .iter()
            .map(|planned| self.planned(planned, scope))
            .collect()
    }

    fn planned(&self, planned: &Planned<'_>, scope: &Scope) -> Expr {
        match planned {
            Planned::Slot { directive, inner } => self.slot(directive, inner, scope),
            Planned::For { directive, inner } => self.for_(directive, inner, scope),
            Planned::If(branch) => self.branch(branch, scope),
            Planned::Node(node) => self.node(node, scope),
        }
    }

    fn slot(&self, directive: &DirectiveNode, inner: &Planned<'_>, scope: &Scope) -> Expr {
        let Some(value) = directive.value() else {
            return self.planned(inner, scope);
        };
        match parse_params(&value.content, value.loc.start) {
            Ok(params) => {
                let inner_scope = scope.extend(pattern_names(&params));
                Expr::arrow(params, self.planned(inner, &inner_scope))
            }
            Err(err) => {
                warn_dropped(directive, &err);
                self.planned(inner, scope)
            }
        }
    }

    fn for_(&self, directive: &DirectiveNode, inner: &Planned<'_>, scope: &Scope) -> Expr {
        let Some(value) = directive.value() else {
            return self.planned(inner, scope);
        };
        let Some((alias, iterable)) = split_v_for(value) else {
            tracing::warn!(
                directive = %directive.raw_name,
                offset = value.loc.start,
                "v-for value is not `alias in expression`"
            );
            return self.planned(inner, scope);
        };

        let iterable = self.expression(directive, iterable.text, iterable.offset, scope);
        let params = match parse_params(alias.text, alias.offset) {
            Ok(params) => params,
            Err(err) => {
                warn_dropped(directive, &err);
                Vec::new()
            }
        };
        let inner_scope = scope.extend(pattern_names(&params));
        Expr::call(
            Expr::identifier(ITERATION_HELPER),
            vec![
                iterable,
                Expr::arrow(params, self.planned(inner, &inner_scope)),
            ],
        )
    }

    fn branch(&self, branch: &Branch<'_>, scope: &Scope) -> Expr {
        let test = match branch.directive.value() {
            Some(value) => self.expression(branch.directive, &value.content, value.loc.start, scope),
            None => Expr::boolean(true),
        };
        let alternate = match &branch.next {
            Some(next) => self.branch(next, scope),
            None => Expr::boolean(true),
        };
        Expr::conditional(test, self.planned(&branch.inner, scope), alternate)
    }

    fn node(&self, node: &TemplateChildNode, scope: &Scope) -> Expr {
        match node {
            TemplateChildNode::Element(el) => self.element(el, scope),
            TemplateChildNode::Interpolation(interpolation) => {
                let content = &interpolation.content;
                if content.is_blank() {
                    return placeholder(content.loc.start);
                }
                self.bound_value(&content.content, content.loc.start, scope, "interpolation")
            }
            TemplateChildNode::Text(text) => Expr::string(&text.content),
            // Filtered out by the planner
            TemplateChildNode::Comment(_) => Expr::string(""),
        }
    }

    fn element(&self, el: &ElementNode, scope: &Scope) -> Expr {
        Expr::call(
            Expr::identifier(COMPONENT_HELPER),
            vec![
                Expr::string(&el.tag),
                self.attributes(el, scope),
                Expr::array(self.children(&el.children, scope)),
            ],
        )
    }

    /// Fold attributes and directives into a `{ props, on, directives }` record.
    fn attributes(&self, el: &ElementNode, scope: &Scope) -> Expr {
        let mut props = Vec::new();
        let mut on = Vec::new();
        let mut directives = Vec::new();

        for prop in &el.props {
            match prop {
                PropNode::Attribute(attr) => {
                    // A bound `:class` may sit next to a plain one; the plain
                    // value is not script anyway
                    if attr.name == "class" || attr.name == "style" {
                        continue;
                    }
                    let value = match &attr.value {
                        Some(value) => Expr::string(&value.content),
                        None => Expr::boolean(true),
                    };
                    props.push(key_value(string_key(&attr.name), value));
                }
                PropNode::Directive(dir) => match dir.name.as_str() {
                    "bind" => props.push(self.bind(dir, scope)),
                    "on" => on.push(self.on(dir, scope)),
                    "slot" | "slot-scope" | "for" | "if" | "else-if" | "else" => {}
                    _ => directives.extend(self.directive(dir, scope)),
                },
            }
        }

        Expr::object(vec![
            key_value(static_key("props"), Expr::object(props)),
            key_value(static_key("on"), Expr::object(on)),
            key_value(static_key("directives"), Expr::array(directives)),
        ])
    }

    fn bind(&self, dir: &DirectiveNode, scope: &Scope) -> Property {
        let value = match &dir.exp {
            None => Expr::boolean(true),
            Some(exp) if exp.is_blank() => placeholder(exp.loc.start),
            Some(exp) => self.bound_value(&exp.content, exp.loc.start, scope, &dir.raw_name),
        };
        self.directive_property(dir, value, scope)
    }

    fn on(&self, dir: &DirectiveNode, scope: &Scope) -> Property {
        let value = match &dir.exp {
            None => Expr::boolean(true),
            Some(exp) if exp.is_blank() => placeholder(exp.loc.start),
            Some(exp) if is_handler_expression(&exp.content) => {
                self.expression(dir, &exp.content, exp.loc.start, scope)
            }
            Some(exp) => self.listener(dir, exp, scope),
        };
        self.directive_property(dir, value, scope)
    }

    /// Wrap handler statements in a function so they see `$event`.
    fn listener(&self, dir: &DirectiveNode, exp: &SimpleExpressionNode, scope: &Scope) -> Expr {
        let handler_scope = scope.with_event_locals();
        let body = match parse_statements(&exp.content, exp.loc.start) {
            Ok(statements) => statements
                .into_iter()
                .map(|stmt| match stmt {
                    Stmt::Expression(_) => inject_this_stmt(stmt, &handler_scope),
                    _ => {
                        tracing::warn!(
                            directive = %dir.raw_name,
                            offset = exp.loc.start,
                            "unexpected statement kind in event handler"
                        );
                        Stmt::Expression(Expr::string(""))
                    }
                })
                .collect(),
            Err(err) => {
                warn_dropped(dir, &err);
                vec![Stmt::Expression(Expr::string(""))]
            }
        };

        let event = Expr::new(ExprKind::Pattern {
            text: "$event".into(),
            names: sfumato_carton::smallvec!["$event".into()],
        });
        Expr::call(
            Expr::identifier(LISTENER_HELPER),
            vec![
                Expr::this(),
                Expr::new(ExprKind::Function {
                    params: vec![event],
                    body,
                }),
            ],
        )
    }

    /// `v-bind:name` / `@name` become `'name': value`, a dynamic argument a
    /// computed key, and no argument at all a spread.
    fn directive_property(&self, dir: &DirectiveNode, value: Expr, scope: &Scope) -> Property {
        match &dir.arg {
            Some(DirectiveArg::Static(name)) => key_value(string_key(&name.content), value),
            Some(DirectiveArg::Dynamic(exp)) if exp.is_blank() => {
                Property::Spread(Expr::object(Vec::new()))
            }
            Some(DirectiveArg::Dynamic(exp)) => {
                let key = self.expression(dir, &exp.content, exp.loc.start, scope);
                key_value(PropertyKey::Computed(key), value)
            }
            None => Property::Spread(value),
        }
    }

    /// Custom and value-only directives: the dynamic argument and the value
    /// are checked as plain expressions.
    fn directive(&self, dir: &DirectiveNode, scope: &Scope) -> Vec<Expr> {
        let mut exprs = Vec::with_capacity(2);
        if let Some(DirectiveArg::Dynamic(exp)) = &dir.arg {
            if !exp.is_blank() {
                exprs.push(self.expression(dir, &exp.content, exp.loc.start, scope));
            }
        }
        if let Some(value) = dir.value() {
            exprs.push(self.expression(dir, &value.content, value.loc.start, scope));
        }
        exprs
    }

    /// A value that may carry filters: interpolations and `v-bind`.
    fn bound_value(&self, text: &str, offset: u32, scope: &Scope, what: &str) -> Expr {
        match split_filters(text, offset) {
            Some(sequence) => self.filtered(sequence, scope, what),
            None => self.parse(text, offset, scope, what),
        }
    }

    /// `exp | f(a) | g` becomes `[[a], []] || exp`: filter arguments stay
    /// checked, filter resolution is not modelled.
    fn filtered(&self, sequence: FilterSequence<'_>, scope: &Scope, what: &str) -> Expr {
        let expression = self.parse(sequence.expression.text, sequence.expression.offset, scope, what);
        let filters = sequence
            .filters
            .iter()
            .map(|filter| {
                Expr::array(
                    filter
                        .arguments
                        .filter(|args| !args.text.trim().is_empty())
                        .map(|args| self.filter_arguments(args, scope, what))
                        .unwrap_or_default(),
                )
            })
            .collect();
        Expr::binary(Expr::array(filters), "||", expression)
    }

    fn filter_arguments(&self, args: Segment<'_>, scope: &Scope, what: &str) -> Vec<Expr> {
        match parse_expression(args.text, args.offset) {
            Ok(Expr {
                kind: ExprKind::Sequence(items),
                ..
            }) => items
                .into_iter()
                .map(|item| inject_this(item, scope))
                .collect(),
            Ok(expr) => vec![inject_this(expr, scope)],
            Err(err) => {
                tracing::warn!(directive = what, offset = err.offset(), error = %err, "dropping filter arguments");
                Vec::new()
            }
        }
    }

    fn expression(&self, dir: &DirectiveNode, text: &str, offset: u32, scope: &Scope) -> Expr {
        self.parse(text, offset, scope, &dir.raw_name)
    }

    fn parse(&self, text: &str, offset: u32, scope: &Scope, what: &str) -> Expr {
        debug_assert!(
            self.source.get(offset as usize..offset as usize + text.len()) == Some(text),
            "expression text must come from the template source"
        );
        match parse_expression(text, offset) {
            Ok(expr) => inject_this(expr, scope),
            Err(err) => {
                tracing::warn!(directive = what, offset, error = %err, "dropping template expression");
                Expr::string("")
            }
        }
    }
}

fn warn_dropped(dir: &DirectiveNode, err: &ExpressionError) {
    tracing::warn!(
        directive = %dir.raw_name,
        offset = err.offset(),
        error = %err,
        "dropping directive value"
    );
}

/// Split a `v-for` value into its alias (parentheses stripped) and its
/// iterable.
fn split_v_for(value: &SimpleExpressionNode) -> Option<(Segment<'_>, Segment<'_>)> {
    let text = value.content.as_str();
    let captures = FOR_ALIAS_RE.captures(text)?;
    let alias = captures.get(1)?;
    let iterable = captures.get(2)?;

    let raw_alias = alias.as_str();
    let lead = raw_alias.len() - raw_alias.trim_start().len();
    let mut alias_text = raw_alias.trim();
    let mut alias_start = alias.start() + lead;
    if let Some(inner) = alias_text
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        alias_text = inner;
        alias_start += 1;
    }

    let base = value.loc.start;
    Some((
        Segment {
            text: alias_text,
            offset: base + alias_start as u32,
        },
        Segment {
            text: iterable.as_str(),
            offset: base + iterable.start() as u32,
        },
    ))
}
