//! Directive values in the script grammar.
//!
//! Template text is handed to `oxc_parser` and the result is lowered into
//! the owned [`Expr`] tree right away, so nothing borrows the arena once a
//! function here returns. Every lowered node is annotated with its span in
//! the template; shapes the transformer does not look into become
//! [`ExprKind::Raw`] and carry no span.

use oxc_allocator::Allocator;
use oxc_ast::ast;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use sfumato_carton::{SmallVec, SourceRange, String};
use thiserror::Error;

use crate::expr::{
    walk_expr, ArrowBody, Expr, ExprKind, Fold, Literal, Property, PropertyKey, Stmt,
};
use crate::scope::Scope;

/// A directive value that is not valid in the script grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("failed to parse `{text}` at offset {offset}: {message}")]
    Syntax {
        text: String,
        offset: u32,
        message: String,
    },

    #[error("`{text}` at offset {offset} is not a single expression")]
    NotAnExpression { text: String, offset: u32 },

    #[error("`{text}` at offset {offset} is not a parameter list")]
    NotAParameterList { text: String, offset: u32 },
}

impl ExpressionError {
    /// Template offset of the offending text
    pub fn offset(&self) -> u32 {
        match self {
            Self::Syntax { offset, .. }
            | Self::NotAnExpression { offset, .. }
            | Self::NotAParameterList { offset, .. } => *offset,
        }
    }
}

fn syntax_error<E: ToString>(text: &str, offset: u32, errors: &[E]) -> ExpressionError {
    ExpressionError::Syntax {
        text: text.into(),
        offset,
        message: errors
            .first()
            .map(ToString::to_string)
            .unwrap_or_default()
            .into(),
    }
}

/// Parse `text`, found at `offset` in the template, as one expression.
pub fn parse_expression(text: &str, offset: u32) -> Result<Expr, ExpressionError> {
    let allocator = Allocator::default();

    // Wrap in parentheses so a leading `{` reads as an object literal
    let mut wrapped = std::string::String::with_capacity(text.len() + 2);
    wrapped.push('(');
    wrapped.push_str(text);
    wrapped.push(')');

    let parsed = Parser::new(&allocator, &wrapped, SourceType::mjs())
        .parse_expression()
        .map_err(|errors| syntax_error(text, offset, &errors))?;

    // `a) + (b` parses too, as a binary expression; only one group will do
    let ast::Expression::ParenthesizedExpression(paren) = &parsed else {
        return Err(ExpressionError::NotAnExpression {
            text: text.into(),
            offset,
        });
    };
    if paren.span.start != 0 || paren.span.end as usize != wrapped.len() {
        return Err(ExpressionError::NotAnExpression {
            text: text.into(),
            offset,
        });
    }

    let lowering = Lowering {
        text: &wrapped,
        origin: offset,
        lead: 1,
    };
    Ok(lowering.expr(&paren.expression))
}

/// Parse a parameter list written without its parentheses, such as
/// `item, index` or `{ row }`.
///
/// Each parameter becomes an [`ExprKind::Pattern`] spanning its text.
pub fn parse_params(text: &str, offset: u32) -> Result<Vec<Expr>, ExpressionError> {
    let allocator = Allocator::default();

    let mut wrapped = std::string::String::with_capacity(text.len() + 7);
    wrapped.push('(');
    wrapped.push_str(text);
    wrapped.push_str(") => 0");

    let parsed = Parser::new(&allocator, &wrapped, SourceType::mjs())
        .parse_expression()
        .map_err(|errors| syntax_error(text, offset, &errors))?;

    let ast::Expression::ArrowFunctionExpression(arrow) = &parsed else {
        return Err(ExpressionError::NotAParameterList {
            text: text.into(),
            offset,
        });
    };

    let lowering = Lowering {
        text: &wrapped,
        origin: offset,
        lead: 1,
    };
    Ok(lowering.params(&arrow.params))
}

/// Parse `text`, found at `offset`, as a statement list.
///
/// Expression and `return` statements are lowered; any other statement is
/// kept as [`Stmt::Raw`].
pub fn parse_statements(text: &str, offset: u32) -> Result<Vec<Stmt>, ExpressionError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, text, SourceType::mjs()).parse();

    if ret.panicked || !ret.errors.is_empty() {
        return Err(syntax_error(text, offset, &ret.errors));
    }

    let lowering = Lowering {
        text,
        origin: offset,
        lead: 0,
    };
    Ok(lowering.statements(&ret.program.body))
}

// ============================================================================
// Lowering
// ============================================================================

/// Converts oxc nodes into [`Expr`] with template spans.
struct Lowering<'t> {
    /// Text handed to the parser
    text: &'t str,
    /// Template offset of the first byte after the wrapper
    origin: u32,
    /// Bytes of wrapper in front of the template text
    lead: u32,
}

impl<'t> Lowering<'t> {
    fn range(&self, span: Span) -> SourceRange {
        SourceRange::new(
            (span.start + self.origin).saturating_sub(self.lead),
            (span.end + self.origin).saturating_sub(self.lead),
        )
    }

    fn slice(&self, span: Span) -> &'t str {
        self.text
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default()
    }

    fn raw(&self, span: Span) -> Expr {
        Expr::new(ExprKind::Raw(self.slice(span).into()))
    }

    fn node(&self, kind: ExprKind, span: Span) -> Expr {
        Expr::with_span(kind, self.range(span))
    }

    fn boxed(&self, expr: &ast::Expression<'_>) -> Box<Expr> {
        Box::new(self.expr(expr))
    }

    fn expr(&self, expr: &ast::Expression<'_>) -> Expr {
        let span = expr.span();
        let kind = match expr {
            ast::Expression::Identifier(id) => ExprKind::Identifier(id.name.as_str().into()),
            ast::Expression::ThisExpression(_) => ExprKind::This,
            ast::Expression::StringLiteral(lit) => {
                ExprKind::Literal(Literal::String(lit.value.as_str().into()))
            }
            ast::Expression::NumericLiteral(_) | ast::Expression::BigIntLiteral(_) => {
                ExprKind::Literal(Literal::Number(self.slice(span).into()))
            }
            ast::Expression::BooleanLiteral(lit) => ExprKind::Literal(Literal::Boolean(lit.value)),
            ast::Expression::NullLiteral(_) => ExprKind::Literal(Literal::Null),
            ast::Expression::TemplateLiteral(tpl) => ExprKind::Template {
                quasis: tpl
                    .quasis
                    .iter()
                    .map(|quasi| quasi.value.raw.as_str().into())
                    .collect(),
                expressions: tpl.expressions.iter().map(|e| self.expr(e)).collect(),
            },
            ast::Expression::StaticMemberExpression(member) => return self.static_member(member),
            ast::Expression::ComputedMemberExpression(member) => {
                return self.computed_member(member)
            }
            ast::Expression::CallExpression(call) => return self.call(call),
            ast::Expression::ChainExpression(chain) => match &chain.expression {
                ast::ChainElement::CallExpression(call) => return self.call(call),
                ast::ChainElement::StaticMemberExpression(member) => {
                    return self.static_member(member)
                }
                ast::ChainElement::ComputedMemberExpression(member) => {
                    return self.computed_member(member)
                }
                _ => return self.raw(span),
            },
            ast::Expression::NewExpression(new_expr) => ExprKind::New {
                callee: self.boxed(&new_expr.callee),
                arguments: self.arguments(&new_expr.arguments),
            },
            ast::Expression::UnaryExpression(unary) => ExprKind::Unary {
                operator: unary.operator.as_str().into(),
                argument: self.boxed(&unary.argument),
            },
            ast::Expression::UpdateExpression(update) => ExprKind::Update {
                operator: update.operator.as_str().into(),
                prefix: update.prefix,
                argument: Box::new(self.simple_target(&update.argument)),
            },
            ast::Expression::BinaryExpression(binary) => ExprKind::Binary {
                left: self.boxed(&binary.left),
                operator: binary.operator.as_str().into(),
                right: self.boxed(&binary.right),
            },
            ast::Expression::LogicalExpression(logical) => ExprKind::Binary {
                left: self.boxed(&logical.left),
                operator: logical.operator.as_str().into(),
                right: self.boxed(&logical.right),
            },
            ast::Expression::AssignmentExpression(assign) => ExprKind::Assignment {
                target: Box::new(self.assignment_target(&assign.left)),
                operator: assign.operator.as_str().into(),
                value: self.boxed(&assign.right),
            },
            ast::Expression::SequenceExpression(seq) => {
                ExprKind::Sequence(seq.expressions.iter().map(|e| self.expr(e)).collect())
            }
            ast::Expression::ConditionalExpression(cond) => ExprKind::Conditional {
                test: self.boxed(&cond.test),
                consequent: self.boxed(&cond.consequent),
                alternate: self.boxed(&cond.alternate),
            },
            ast::Expression::ParenthesizedExpression(paren) => {
                ExprKind::Paren(self.boxed(&paren.expression))
            }
            ast::Expression::ObjectExpression(obj) => {
                ExprKind::Object(obj.properties.iter().map(|p| self.property(p)).collect())
            }
            ast::Expression::ArrayExpression(arr) => ExprKind::Array(
                arr.elements
                    .iter()
                    .map(|element| match element {
                        ast::ArrayExpressionElement::SpreadElement(spread) => {
                            Some(self.spread(spread))
                        }
                        ast::ArrayExpressionElement::Elision(_) => None,
                        _ => Some(match element.as_expression() {
                            Some(e) => self.expr(e),
                            None => self.raw(element.span()),
                        }),
                    })
                    .collect(),
            ),
            ast::Expression::ArrowFunctionExpression(arrow) => {
                let body = if arrow.expression {
                    match arrow.body.statements.first() {
                        Some(ast::Statement::ExpressionStatement(stmt)) => {
                            ArrowBody::Expression(self.boxed(&stmt.expression))
                        }
                        _ => ArrowBody::Block(Vec::new()),
                    }
                } else {
                    ArrowBody::Block(self.statements(&arrow.body.statements))
                };
                ExprKind::Arrow {
                    params: self.params(&arrow.params),
                    body,
                }
            }
            ast::Expression::FunctionExpression(func) => ExprKind::Function {
                params: self.params(&func.params),
                body: func
                    .body
                    .as_ref()
                    .map(|body| self.statements(&body.statements))
                    .unwrap_or_default(),
            },
            // Regex literals, classes, tagged templates, TS-only syntax, ...
            _ => return self.raw(span),
        };
        self.node(kind, span)
    }

    fn static_member(&self, member: &ast::StaticMemberExpression<'_>) -> Expr {
        self.node(
            ExprKind::Member {
                object: self.boxed(&member.object),
                property: member.property.name.as_str().into(),
                optional: member.optional,
            },
            member.span,
        )
    }

    fn computed_member(&self, member: &ast::ComputedMemberExpression<'_>) -> Expr {
        self.node(
            ExprKind::Computed {
                object: self.boxed(&member.object),
                property: self.boxed(&member.expression),
                optional: member.optional,
            },
            member.span,
        )
    }

    fn call(&self, call: &ast::CallExpression<'_>) -> Expr {
        self.node(
            ExprKind::Call {
                callee: self.boxed(&call.callee),
                arguments: self.arguments(&call.arguments),
                optional: call.optional,
            },
            call.span,
        )
    }

    fn spread(&self, spread: &ast::SpreadElement<'_>) -> Expr {
        self.node(ExprKind::Spread(self.boxed(&spread.argument)), spread.span)
    }

    fn arguments(&self, arguments: &[ast::Argument<'_>]) -> Vec<Expr> {
        arguments
            .iter()
            .map(|arg| match arg {
                ast::Argument::SpreadElement(spread) => self.spread(spread),
                _ => match arg.as_expression() {
                    Some(e) => self.expr(e),
                    None => self.raw(arg.span()),
                },
            })
            .collect()
    }

    fn simple_target(&self, target: &ast::SimpleAssignmentTarget<'_>) -> Expr {
        match target {
            ast::SimpleAssignmentTarget::AssignmentTargetIdentifier(id) => {
                self.node(ExprKind::Identifier(id.name.as_str().into()), id.span)
            }
            ast::SimpleAssignmentTarget::StaticMemberExpression(member) => {
                self.static_member(member)
            }
            ast::SimpleAssignmentTarget::ComputedMemberExpression(member) => {
                self.computed_member(member)
            }
            _ => self.raw(target.span()),
        }
    }

    fn assignment_target(&self, target: &ast::AssignmentTarget<'_>) -> Expr {
        match target {
            ast::AssignmentTarget::AssignmentTargetIdentifier(id) => {
                self.node(ExprKind::Identifier(id.name.as_str().into()), id.span)
            }
            ast::AssignmentTarget::StaticMemberExpression(member) => self.static_member(member),
            ast::AssignmentTarget::ComputedMemberExpression(member) => {
                self.computed_member(member)
            }
            // Destructuring targets bind, they do not read
            _ => self.raw(target.span()),
        }
    }

    fn property(&self, property: &ast::ObjectPropertyKind<'_>) -> Property {
        let prop = match property {
            ast::ObjectPropertyKind::ObjectProperty(prop) => prop,
            ast::ObjectPropertyKind::SpreadProperty(spread) => {
                return Property::Spread(self.spread(spread))
            }
        };
        if prop.method || prop.kind != ast::PropertyKind::Init {
            return Property::Raw(self.slice(prop.span).into());
        }

        let key = if prop.computed {
            prop.key.as_expression().map(|e| PropertyKey::Computed(self.expr(e)))
        } else {
            match &prop.key {
                ast::PropertyKey::StaticIdentifier(id) => Some(PropertyKey::Static(
                    self.node(ExprKind::Identifier(id.name.as_str().into()), id.span),
                )),
                ast::PropertyKey::PrivateIdentifier(_) => None,
                key => key.as_expression().map(|e| PropertyKey::Static(self.expr(e))),
            }
        };
        match key {
            Some(key) => Property::KeyValue {
                key,
                value: self.expr(&prop.value),
                shorthand: prop.shorthand,
            },
            None => Property::Raw(self.slice(prop.span).into()),
        }
    }

    fn params(&self, params: &ast::FormalParameters<'_>) -> Vec<Expr> {
        let mut lowered: Vec<Expr> = params
            .items
            .iter()
            .map(|param| self.pattern(param.span, &param.pattern))
            .collect();
        if let Some(rest) = &params.rest {
            lowered.push(self.pattern(rest.span, &rest.rest.argument));
        }
        lowered
    }

    fn pattern(&self, span: Span, pattern: &ast::BindingPattern<'_>) -> Expr {
        let mut names = SmallVec::new();
        collect_binding_names(pattern, &mut names);
        self.node(
            ExprKind::Pattern {
                text: self.slice(span).into(),
                names,
            },
            span,
        )
    }

    fn statements(&self, statements: &[ast::Statement<'_>]) -> Vec<Stmt> {
        statements
            .iter()
            .map(|stmt| match stmt {
                ast::Statement::ExpressionStatement(stmt) => {
                    Stmt::Expression(self.expr(&stmt.expression))
                }
                ast::Statement::ReturnStatement(ret) => {
                    Stmt::Return(ret.argument.as_ref().map(|e| self.expr(e)))
                }
                other => Stmt::Raw(self.slice(other.span()).into()),
            })
            .collect()
    }
}

/// Collect the names a binding pattern introduces.
///
/// `(foo, { bar, baz: qux }, [x = 1, ...rest])` introduces `foo`, `bar`,
/// `qux`, `x` and `rest`.
fn collect_binding_names(pattern: &ast::BindingPattern<'_>, names: &mut SmallVec<[String; 3]>) {
    match pattern {
        ast::BindingPattern::BindingIdentifier(id) => {
            names.push(String::new(id.name.as_str()));
        }
        ast::BindingPattern::ObjectPattern(obj) => {
            for prop in obj.properties.iter() {
                collect_binding_names(&prop.value, names);
            }
            if let Some(rest) = &obj.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        ast::BindingPattern::ArrayPattern(arr) => {
            for elem in arr.elements.iter().flatten() {
                collect_binding_names(elem, names);
            }
            if let Some(rest) = &arr.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        ast::BindingPattern::AssignmentPattern(assign) => {
            collect_binding_names(&assign.left, names);
        }
    }
}

/// Names introduced by a list of [`ExprKind::Pattern`] parameters.
pub fn pattern_names(params: &[Expr]) -> Vec<String> {
    params
        .iter()
        .flat_map(|param| match &param.kind {
            ExprKind::Pattern { names, .. } => names.iter().cloned().collect(),
            _ => Vec::new(),
        })
        .collect()
}

// ============================================================================
// This-injection
// ============================================================================

/// Rewrites free identifiers into `this.<name>`.
struct ThisInjector {
    scope: Scope,
}

impl Fold for ThisInjector {
    fn fold_expr(&mut self, expr: Expr) -> Expr {
        match &expr.kind {
            ExprKind::Identifier(name) if !self.scope.contains(name) => {
                Expr::this_member(name, expr.span)
            }
            ExprKind::Arrow { params, .. } => {
                let inner = self.scope.extend(pattern_names(params));
                let outer = std::mem::replace(&mut self.scope, inner);
                let folded = walk_expr(self, expr);
                self.scope = outer;
                folded
            }
            // Function bodies are kept as written
            ExprKind::Function { .. } => expr,
            _ => walk_expr(self, expr),
        }
    }
}

/// Rewrite every identifier of `expr` that is not in `scope` into an
/// implicit-receiver access.
///
/// The rewritten node keeps the identifier's span, so the source map can
/// tell the `this.` prefix apart from text the user wrote.
pub fn inject_this(expr: Expr, scope: &Scope) -> Expr {
    ThisInjector {
        scope: scope.clone(),
    }
    .fold_expr(expr)
}

/// [`inject_this`] for a statement.
pub fn inject_this_stmt(stmt: Stmt, scope: &Scope) -> Stmt {
    ThisInjector {
        scope: scope.clone(),
    }
    .fold_stmt(stmt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_expr;

    /// Parse, inject with `scope`, print against the input.
    fn inject(source: &str, scope: &[&str]) -> std::string::String {
        let expr = parse_expression(source, 0).expect("valid expression");
        let injected = inject_this(expr, &Scope::empty().extend(scope.iter().copied()));
        print_expr(&injected, source)
    }

    #[test]
    fn test_identifier() {
        assert_eq!(inject("foo", &[]), "this.foo");
        assert_eq!(inject("foo", &["foo"]), "foo");
    }

    #[test]
    fn test_member_access() {
        insta::assert_snapshot!(inject("foo.bar.baz", &[]), @"this.foo.bar.baz");
        insta::assert_snapshot!(inject("foo[bar]", &[]), @"this.foo[this.bar]");
        insta::assert_snapshot!(inject("foo?.bar", &[]), @"this.foo?.bar");
    }

    #[test]
    fn test_calls() {
        insta::assert_snapshot!(inject("foo(bar, ...baz)", &[]), @"this.foo(this.bar, ...this.baz)");
        insta::assert_snapshot!(inject("new Test()", &[]), @"new this.Test()");
        insta::assert_snapshot!(inject("Math.max(a, 1)", &[]), @"this.Math.max(this.a, 1)");
    }

    #[test]
    fn test_operators() {
        insta::assert_snapshot!(inject("-foo", &[]), @"-this.foo");
        insta::assert_snapshot!(inject("typeof foo", &[]), @"typeof this.foo");
        insta::assert_snapshot!(inject("delete foo.bar", &[]), @"delete this.foo.bar");
        insta::assert_snapshot!(inject("void foo", &[]), @"void this.foo");
        insta::assert_snapshot!(inject("foo++", &[]), @"this.foo++");
        insta::assert_snapshot!(inject("--foo", &[]), @"--this.foo");
        insta::assert_snapshot!(inject("foo + bar", &[]), @"this.foo + this.bar");
        insta::assert_snapshot!(inject("foo && bar || baz", &[]), @"this.foo && this.bar || this.baz");
        insta::assert_snapshot!(inject("foo = bar", &[]), @"this.foo = this.bar");
        insta::assert_snapshot!(inject("foo, bar", &[]), @"this.foo, this.bar");
        insta::assert_snapshot!(inject("foo ? bar : baz", &[]), @"this.foo ? this.bar : this.baz");
        insta::assert_snapshot!(inject("(foo)", &[]), @"(this.foo)");
    }

    #[test]
    fn test_object_literal() {
        insta::assert_snapshot!(inject("{ foo: bar }", &[]), @"{ foo: this.bar }");
        insta::assert_snapshot!(inject("{ 'foo': bar }", &[]), @"{ 'foo': this.bar }");
        insta::assert_snapshot!(inject("{ [foo]: bar }", &[]), @"{ [this.foo]: this.bar }");
        insta::assert_snapshot!(inject("{ foo }", &[]), @"{ foo: this.foo }");
        insta::assert_snapshot!(inject("{ foo }", &["foo"]), @"{ foo }");
        insta::assert_snapshot!(inject("{ ...foo }", &[]), @"{ ...this.foo }");
    }

    #[test]
    fn test_array_literal() {
        insta::assert_snapshot!(inject("[foo, , ...bar]", &[]), @"[this.foo, , ...this.bar]");
    }

    #[test]
    fn test_arrow_functions() {
        insta::assert_snapshot!(inject("bar => foo + bar", &[]), @"bar => this.foo + bar");
        insta::assert_snapshot!(
            inject("({ a }, [b = c]) => a + b + c + d", &[]),
            @"({ a }, [b = c]) => a + b + this.c + this.d"
        );
        insta::assert_snapshot!(inject("(bar) => { foo + bar; }", &[]), @"(bar) => { this.foo + bar; }");
        insta::assert_snapshot!(
            inject("() => { if (a) b(); return c }", &[]),
            @"() => { if (a) b(); return this.c }"
        );
    }

    #[test]
    fn test_function_expression_kept() {
        insta::assert_snapshot!(inject("function () { foo() }", &[]), @"function () { foo() }");
    }

    #[test]
    fn test_template_literal() {
        insta::assert_snapshot!(inject("`${foo} and ${bar.baz}`", &[]), @"`${this.foo} and ${this.bar.baz}`");
    }

    #[test]
    fn test_unsupported_shapes_kept() {
        insta::assert_snapshot!(inject("foo.test(/a+/)", &[]), @"this.foo.test(/a+/)");
        insta::assert_snapshot!(inject("tag`x`", &[]), @"tag`x`");
    }

    #[test]
    fn test_globals_left_alone() {
        let expr = parse_expression("Math.max(a, Infinity)", 0).expect("valid expression");
        let injected = inject_this(expr, &Scope::template_root(std::iter::empty::<&str>()));
        insta::assert_snapshot!(
            print_expr(&injected, "Math.max(a, Infinity)"),
            @"Math.max(this.a, Infinity)"
        );
    }

    #[test]
    fn test_spans_are_template_offsets() {
        // `foo.bar` found at offset 10 of some template
        let expr = parse_expression("foo.bar", 10).expect("valid expression");
        assert_eq!(expr.span, Some(SourceRange::new(10, 17)));
        let ExprKind::Member { object, .. } = &expr.kind else {
            panic!("Expected member expression");
        };
        assert_eq!(object.span, Some(SourceRange::new(10, 13)));
    }

    #[test]
    fn test_parse_errors() {
        let Err(ExpressionError::Syntax { offset, .. }) = parse_expression("foo +", 4) else {
            panic!("Expected a syntax error");
        };
        assert_eq!(offset, 4);

        assert!(matches!(
            parse_expression("a) + (b", 0),
            Err(ExpressionError::NotAnExpression { .. })
        ));
    }

    #[test]
    fn test_parse_params() {
        let params = parse_params("{ a, b: c }, index", 5).expect("valid params");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].span, Some(SourceRange::new(5, 16)));
        assert_eq!(params[1].span, Some(SourceRange::new(18, 23)));

        let names = pattern_names(&params);
        let names: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "index"]);

        let params = parse_params("item, ...rest", 0).expect("valid params");
        assert_eq!(pattern_names(&params).len(), 2);
    }

    #[test]
    fn test_arrow_params_collect_nested_names() {
        let source = "({ a, b: [c, ...d] = e }, ...f) => 0";
        let Ok(expr) = parse_expression(source, 0) else {
            panic!("Expected an arrow function");
        };
        let ExprKind::Arrow { params, .. } = &expr.kind else {
            panic!("Expected an arrow function");
        };
        assert_eq!(params.len(), 2);
        let names = pattern_names(params);
        let names: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "d", "f"]);

        let Ok(params) = parse_params("[x = 1, ...ys], { z: { w } }", 0) else {
            panic!("Expected a parameter list");
        };
        let names = pattern_names(&params);
        let names: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["x", "ys", "w"]);
    }

    #[test]
    fn test_parse_statements() {
        let stmts = parse_statements("count++; if (a) b()", 3).expect("valid statements");
        assert_eq!(stmts.len(), 2);
        let Stmt::Expression(expr) = &stmts[0] else {
            panic!("Expected expression statement");
        };
        assert_eq!(expr.span, Some(SourceRange::new(3, 10)));
        assert!(matches!(stmts[1], Stmt::Raw(_)));

        let injected = inject_this_stmt(stmts[0].clone(), &Scope::empty());
        let Stmt::Expression(expr) = injected else {
            panic!("Expected expression statement");
        };
        let ExprKind::Update { argument, .. } = &expr.kind else {
            panic!("Expected update expression");
        };
        assert!(argument.is_injected_receiver());
    }
}
