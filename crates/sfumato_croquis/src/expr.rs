//! Synthetic expression tree.
//!
//! The transformer builds its output from a small closed set of script
//! expression shapes. A node parsed out of real template text carries the
//! byte span it came from; nodes invented as scaffolding (helper calls,
//! record literals) carry no span and never appear in the source map.
//!
//! The same tree type is used for the materialized side: re-parsing the
//! printed program lowers it into `Expr` again, with spans pointing into the
//! printed text. The two trees are then walked in lockstep.

use sfumato_carton::{smallvec, SmallVec, SourceRange, String};

/// A node of the synthetic tree
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Span in the text this node was parsed from, `None` for scaffolding
    pub span: Option<SourceRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Identifier(String),
    This,
    Literal(Literal),
    /// `object.property`, `object?.property`
    Member {
        object: Box<Expr>,
        property: String,
        optional: bool,
    },
    /// `object[property]`
    Computed {
        object: Box<Expr>,
        property: Box<Expr>,
        optional: bool,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        optional: bool,
    },
    New {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    /// Prefix operators, `typeof`, `void` and `delete` included
    Unary {
        operator: String,
        argument: Box<Expr>,
    },
    Update {
        operator: String,
        prefix: bool,
        argument: Box<Expr>,
    },
    /// Arithmetic, comparison and logical operators
    Binary {
        left: Box<Expr>,
        operator: String,
        right: Box<Expr>,
    },
    Assignment {
        target: Box<Expr>,
        operator: String,
        value: Box<Expr>,
    },
    Sequence(Vec<Expr>),
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Paren(Box<Expr>),
    Object(Vec<Property>),
    /// Array literal; `None` is a hole
    Array(Vec<Option<Expr>>),
    /// `...argument` inside an array literal or an argument list
    Spread(Box<Expr>),
    Arrow {
        params: Vec<Expr>,
        body: ArrowBody,
    },
    Function {
        params: Vec<Expr>,
        body: Vec<Stmt>,
    },
    /// Untagged template literal; `quasis` has one more entry than `expressions`
    Template {
        quasis: Vec<String>,
        expressions: Vec<Expr>,
    },
    /// A function parameter, printed as written
    Pattern {
        text: String,
        names: SmallVec<[String; 3]>,
    },
    /// A shape the transformer does not look into, printed as written
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    /// Numeric, bigint and other literal text kept as written
    Number(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expression(Box<Expr>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),
    Return(Option<Expr>),
    /// Any other statement, printed as written
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    KeyValue {
        key: PropertyKey,
        value: Expr,
        /// `{ foo }`; key and value share one span
        shorthand: bool,
    },
    Spread(Expr),
    /// Methods and accessors, printed as written
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    /// Identifier, string or numeric key; an `Identifier` or `Literal` node
    Static(Expr),
    /// `[expr]`
    Computed(Expr),
}

impl PropertyKey {
    pub fn expr(&self) -> &Expr {
        match self {
            Self::Static(expr) | Self::Computed(expr) => expr,
        }
    }
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self { kind, span: None }
    }

    pub fn with_span(kind: ExprKind, span: SourceRange) -> Self {
        Self {
            kind,
            span: Some(span),
        }
    }

    pub fn identifier(name: impl AsRef<str>) -> Self {
        Self::new(ExprKind::Identifier(String::new(name.as_ref())))
    }

    pub fn this() -> Self {
        Self::new(ExprKind::This)
    }

    pub fn string(value: impl AsRef<str>) -> Self {
        Self::new(ExprKind::Literal(Literal::String(String::new(value.as_ref()))))
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ExprKind::Literal(Literal::Boolean(value)))
    }

    pub fn call(callee: Expr, arguments: Vec<Expr>) -> Self {
        Self::new(ExprKind::Call {
            callee: Box::new(callee),
            arguments,
            optional: false,
        })
    }

    pub fn array(elements: Vec<Expr>) -> Self {
        Self::new(ExprKind::Array(elements.into_iter().map(Some).collect()))
    }

    pub fn object(properties: Vec<Property>) -> Self {
        Self::new(ExprKind::Object(properties))
    }

    pub fn conditional(test: Expr, consequent: Expr, alternate: Expr) -> Self {
        Self::new(ExprKind::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    pub fn arrow(params: Vec<Expr>, body: Expr) -> Self {
        Self::new(ExprKind::Arrow {
            params,
            body: ArrowBody::Expression(Box::new(body)),
        })
    }

    pub fn binary(left: Expr, operator: &str, right: Expr) -> Self {
        Self::new(ExprKind::Binary {
            left: Box::new(left),
            operator: String::new(operator),
            right: Box::new(right),
        })
    }

    /// `this.<name>` standing in for a free identifier at `span`.
    pub fn this_member(name: impl AsRef<str>, span: Option<SourceRange>) -> Self {
        Self {
            kind: ExprKind::Member {
                object: Box::new(Self::this()),
                property: String::new(name.as_ref()),
                optional: false,
            },
            span,
        }
    }

    /// Whether this node is an implicit receiver access produced by
    /// rewriting a free identifier: a spanned member access on an unspanned
    /// `this`.
    pub fn is_injected_receiver(&self) -> bool {
        match &self.kind {
            ExprKind::Member { object, .. } => {
                self.span.is_some() && object.span.is_none() && object.kind == ExprKind::This
            }
            _ => false,
        }
    }

    /// Direct child expressions, in source order.
    ///
    /// Both sides of a lockstep walk see the same sequence for congruent
    /// trees: a shorthand property contributes its key and its value, and
    /// holes contribute nothing.
    pub fn children(&self) -> SmallVec<[&Expr; 4]> {
        match &self.kind {
            ExprKind::Identifier(_)
            | ExprKind::This
            | ExprKind::Literal(_)
            | ExprKind::Pattern { .. }
            | ExprKind::Raw(_) => SmallVec::new(),
            ExprKind::Member { object, .. } => smallvec![object.as_ref()],
            ExprKind::Computed {
                object, property, ..
            } => smallvec![object.as_ref(), property.as_ref()],
            ExprKind::Call {
                callee, arguments, ..
            }
            | ExprKind::New { callee, arguments } => {
                let mut children: SmallVec<[&Expr; 4]> = smallvec![callee.as_ref()];
                children.extend(arguments.iter());
                children
            }
            ExprKind::Unary { argument, .. } | ExprKind::Update { argument, .. } => {
                smallvec![argument.as_ref()]
            }
            ExprKind::Binary { left, right, .. } => smallvec![left.as_ref(), right.as_ref()],
            ExprKind::Assignment { target, value, .. } => {
                smallvec![target.as_ref(), value.as_ref()]
            }
            ExprKind::Sequence(expressions) => expressions.iter().collect(),
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => smallvec![test.as_ref(), consequent.as_ref(), alternate.as_ref()],
            ExprKind::Paren(inner) | ExprKind::Spread(inner) => smallvec![inner.as_ref()],
            ExprKind::Object(properties) => {
                let mut children = SmallVec::new();
                for property in properties {
                    match property {
                        Property::KeyValue { key, value, .. } => {
                            children.push(key.expr());
                            children.push(value);
                        }
                        Property::Spread(argument) => children.push(argument),
                        Property::Raw(_) => {}
                    }
                }
                children
            }
            ExprKind::Array(elements) => elements.iter().flatten().collect(),
            ExprKind::Arrow { params, body } => {
                let mut children: SmallVec<[&Expr; 4]> = params.iter().collect();
                match body {
                    ArrowBody::Expression(expr) => children.push(expr),
                    ArrowBody::Block(statements) => {
                        children.extend(statements.iter().filter_map(Stmt::expr))
                    }
                }
                children
            }
            ExprKind::Function { params, body } => {
                let mut children: SmallVec<[&Expr; 4]> = params.iter().collect();
                children.extend(body.iter().filter_map(Stmt::expr));
                children
            }
            ExprKind::Template { expressions, .. } => expressions.iter().collect(),
        }
    }

    /// Binding strength, higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match &self.kind {
            ExprKind::Raw(_) => 0,
            ExprKind::Sequence(_) => 1,
            ExprKind::Assignment { .. } | ExprKind::Arrow { .. } | ExprKind::Spread(_) => 2,
            ExprKind::Conditional { .. } => 3,
            ExprKind::Binary { operator, .. } => binary_precedence(operator),
            ExprKind::Unary { .. } => 15,
            ExprKind::Update { .. } => 16,
            ExprKind::New { .. } => 17,
            ExprKind::Member { .. } | ExprKind::Computed { .. } | ExprKind::Call { .. } => 18,
            ExprKind::Identifier(_)
            | ExprKind::This
            | ExprKind::Literal(_)
            | ExprKind::Paren(_)
            | ExprKind::Object(_)
            | ExprKind::Array(_)
            | ExprKind::Function { .. }
            | ExprKind::Template { .. }
            | ExprKind::Pattern { .. } => 19,
        }
    }
}

impl Stmt {
    /// The expression this statement carries, if any.
    pub fn expr(&self) -> Option<&Expr> {
        match self {
            Self::Expression(expr) | Self::Return(Some(expr)) => Some(expr),
            Self::Return(None) | Self::Raw(_) => None,
        }
    }
}

/// Binding strength of a binary or logical operator.
pub fn binary_precedence(operator: &str) -> u8 {
    match operator {
        "||" | "??" => 4,
        "&&" => 5,
        "|" => 6,
        "^" => 7,
        "&" => 8,
        "==" | "!=" | "===" | "!==" => 9,
        "<" | ">" | "<=" | ">=" | "instanceof" | "in" => 10,
        "<<" | ">>" | ">>>" => 11,
        "+" | "-" => 12,
        "*" | "/" | "%" => 13,
        "**" => 14,
        _ => 4,
    }
}

// ============================================================================
// Fold
// ============================================================================

/// A by-value rewrite over the tree.
///
/// Each method defaults to rebuilding the node from its folded children, so
/// an implementation overrides only the shapes it cares about and calls the
/// matching `walk_*` function to keep descending.
pub trait Fold {
    fn fold_expr(&mut self, expr: Expr) -> Expr {
        walk_expr(self, expr)
    }

    fn fold_property(&mut self, property: Property) -> Property {
        walk_property(self, property)
    }

    fn fold_stmt(&mut self, stmt: Stmt) -> Stmt {
        walk_stmt(self, stmt)
    }
}

fn fold_box<F: Fold + ?Sized>(folder: &mut F, expr: Box<Expr>) -> Box<Expr> {
    Box::new(folder.fold_expr(*expr))
}

fn fold_vec<F: Fold + ?Sized>(folder: &mut F, exprs: Vec<Expr>) -> Vec<Expr> {
    exprs.into_iter().map(|expr| folder.fold_expr(expr)).collect()
}

/// Rebuild `expr` with every child folded. The span is kept.
pub fn walk_expr<F: Fold + ?Sized>(folder: &mut F, expr: Expr) -> Expr {
    let Expr { kind, span } = expr;
    let kind = match kind {
        ExprKind::Identifier(_)
        | ExprKind::This
        | ExprKind::Literal(_)
        | ExprKind::Pattern { .. }
        | ExprKind::Raw(_) => kind,
        ExprKind::Member {
            object,
            property,
            optional,
        } => ExprKind::Member {
            object: fold_box(folder, object),
            property,
            optional,
        },
        ExprKind::Computed {
            object,
            property,
            optional,
        } => ExprKind::Computed {
            object: fold_box(folder, object),
            property: fold_box(folder, property),
            optional,
        },
        ExprKind::Call {
            callee,
            arguments,
            optional,
        } => ExprKind::Call {
            callee: fold_box(folder, callee),
            arguments: fold_vec(folder, arguments),
            optional,
        },
        ExprKind::New { callee, arguments } => ExprKind::New {
            callee: fold_box(folder, callee),
            arguments: fold_vec(folder, arguments),
        },
        ExprKind::Unary { operator, argument } => ExprKind::Unary {
            operator,
            argument: fold_box(folder, argument),
        },
        ExprKind::Update {
            operator,
            prefix,
            argument,
        } => ExprKind::Update {
            operator,
            prefix,
            argument: fold_box(folder, argument),
        },
        ExprKind::Binary {
            left,
            operator,
            right,
        } => ExprKind::Binary {
            left: fold_box(folder, left),
            operator,
            right: fold_box(folder, right),
        },
        ExprKind::Assignment {
            target,
            operator,
            value,
        } => ExprKind::Assignment {
            target: fold_box(folder, target),
            operator,
            value: fold_box(folder, value),
        },
        ExprKind::Sequence(expressions) => ExprKind::Sequence(fold_vec(folder, expressions)),
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => ExprKind::Conditional {
            test: fold_box(folder, test),
            consequent: fold_box(folder, consequent),
            alternate: fold_box(folder, alternate),
        },
        ExprKind::Paren(inner) => ExprKind::Paren(fold_box(folder, inner)),
        ExprKind::Spread(inner) => ExprKind::Spread(fold_box(folder, inner)),
        ExprKind::Object(properties) => ExprKind::Object(
            properties
                .into_iter()
                .map(|property| folder.fold_property(property))
                .collect(),
        ),
        ExprKind::Array(elements) => ExprKind::Array(
            elements
                .into_iter()
                .map(|element| element.map(|expr| folder.fold_expr(expr)))
                .collect(),
        ),
        ExprKind::Arrow { params, body } => ExprKind::Arrow {
            params: fold_vec(folder, params),
            body: match body {
                ArrowBody::Expression(expr) => ArrowBody::Expression(fold_box(folder, expr)),
                ArrowBody::Block(statements) => ArrowBody::Block(
                    statements
                        .into_iter()
                        .map(|stmt| folder.fold_stmt(stmt))
                        .collect(),
                ),
            },
        },
        ExprKind::Function { params, body } => ExprKind::Function {
            params: fold_vec(folder, params),
            body: body.into_iter().map(|stmt| folder.fold_stmt(stmt)).collect(),
        },
        ExprKind::Template {
            quasis,
            expressions,
        } => ExprKind::Template {
            quasis,
            expressions: fold_vec(folder, expressions),
        },
    };
    Expr { kind, span }
}

/// Rebuild `property` with its value and computed key folded. Static keys
/// are names, not references, and are left alone.
pub fn walk_property<F: Fold + ?Sized>(folder: &mut F, property: Property) -> Property {
    match property {
        Property::KeyValue {
            key,
            value,
            shorthand,
        } => Property::KeyValue {
            key: match key {
                PropertyKey::Computed(expr) => PropertyKey::Computed(folder.fold_expr(expr)),
                key @ PropertyKey::Static(_) => key,
            },
            value: folder.fold_expr(value),
            shorthand,
        },
        Property::Spread(argument) => Property::Spread(folder.fold_expr(argument)),
        Property::Raw(_) => property,
    }
}

pub fn walk_stmt<F: Fold + ?Sized>(folder: &mut F, stmt: Stmt) -> Stmt {
    match stmt {
        Stmt::Expression(expr) => Stmt::Expression(folder.fold_expr(expr)),
        Stmt::Return(argument) => Stmt::Return(argument.map(|expr| folder.fold_expr(expr))),
        Stmt::Raw(_) => stmt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Renames every identifier to upper case.
    struct Shout;

    impl Fold for Shout {
        fn fold_expr(&mut self, expr: Expr) -> Expr {
            match expr.kind {
                ExprKind::Identifier(name) => Expr {
                    kind: ExprKind::Identifier(name.to_uppercase().into()),
                    span: expr.span,
                },
                _ => walk_expr(self, expr),
            }
        }
    }

    #[test]
    fn test_fold_keeps_spans_and_static_keys() {
        let key = PropertyKey::Static(Expr::with_span(
            ExprKind::Identifier("key".into()),
            SourceRange::new(1, 4),
        ));
        let value = Expr::with_span(ExprKind::Identifier("value".into()), SourceRange::new(6, 11));
        let object = Expr::with_span(
            ExprKind::Object(vec![Property::KeyValue {
                key,
                value,
                shorthand: false,
            }]),
            SourceRange::new(0, 12),
        );

        let folded = Shout.fold_expr(object);
        assert_eq!(folded.span, Some(SourceRange::new(0, 12)));
        let ExprKind::Object(properties) = &folded.kind else {
            panic!("Expected object");
        };
        let Property::KeyValue { key, value, .. } = &properties[0] else {
            panic!("Expected key-value property");
        };
        assert_eq!(key.expr().kind, ExprKind::Identifier("key".into()));
        assert_eq!(value.kind, ExprKind::Identifier("VALUE".into()));
        assert_eq!(value.span, Some(SourceRange::new(6, 11)));
    }

    #[test]
    fn test_children_order() {
        let call = Expr::call(
            Expr::identifier("f"),
            vec![Expr::identifier("a"), Expr::identifier("b")],
        );
        let names: Vec<_> = call
            .children()
            .iter()
            .map(|child| match &child.kind {
                ExprKind::Identifier(name) => name.as_str(),
                _ => "?",
            })
            .collect();
        assert_eq!(names, vec!["f", "a", "b"]);

        let array = Expr::new(ExprKind::Array(vec![None, Some(Expr::identifier("x"))]));
        assert_eq!(array.children().len(), 1);
    }

    #[test]
    fn test_injected_receiver() {
        let injected = Expr::this_member("foo", Some(SourceRange::new(0, 3)));
        assert!(injected.is_injected_receiver());

        // written by the user: the receiver has a span of its own
        let written = Expr::with_span(
            ExprKind::Member {
                object: Box::new(Expr::with_span(ExprKind::This, SourceRange::new(0, 4))),
                property: "foo".into(),
                optional: false,
            },
            SourceRange::new(0, 8),
        );
        assert!(!written.is_injected_receiver());

        // scaffolding
        assert!(!Expr::this_member("foo", None).is_injected_receiver());
    }

    #[test]
    fn test_precedence() {
        assert!(Expr::binary(Expr::identifier("a"), "*", Expr::identifier("b")).precedence()
            > Expr::binary(Expr::identifier("a"), "+", Expr::identifier("b")).precedence());
        assert!(Expr::conditional(Expr::boolean(true), Expr::boolean(true), Expr::boolean(true))
            .precedence()
            < Expr::binary(Expr::identifier("a"), "||", Expr::identifier("b")).precedence());
    }
}
