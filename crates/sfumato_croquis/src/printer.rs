//! Print a synthetic tree as script text.
//!
//! Printing is source-preserving: a node with a span is printed as the
//! template text under that span, with only its rewritten descendants
//! spliced in. The only rewrites are `this.` in front of a free identifier
//! and the expansion of a shorthand property (`{ foo }` becomes
//! `{ foo: this.foo }`). Scaffolding without a span is printed canonically,
//! with parentheses only where precedence demands them.

use crate::expr::{binary_precedence, ArrowBody, Expr, ExprKind, Literal, Property, PropertyKey, Stmt};

/// Receiver prefix put in front of a free identifier
pub const THIS_DOT: &str = "this.";

/// Print `expr`; spans are offsets into `source`.
pub fn print_expr(expr: &Expr, source: &str) -> String {
    let mut printer = Printer::new(source);
    printer.expr(expr, 0);
    printer.out
}

/// Print `expr` so it can stand as an expression statement.
pub fn print_statement_expr(expr: &Expr, source: &str) -> String {
    let text = print_expr(expr, source);
    if needs_statement_parens(&text) {
        format!("({text})")
    } else {
        text
    }
}

/// A statement starting with these would not read as an expression.
fn needs_statement_parens(text: &str) -> bool {
    let text = text.trim_start();
    text.starts_with('{')
        || text.starts_with("function")
        || text.starts_with("class")
        || text.starts_with("let [")
}

// Precedence levels used as "at least" requirements
const ASSIGN: u8 = 2;
const CONDITIONAL_TEST: u8 = 4;
const UNARY: u8 = 15;
const MEMBER: u8 = 18;

struct Printer<'s> {
    source: &'s str,
    out: String,
}

impl<'s> Printer<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            out: String::new(),
        }
    }

    fn sub(&self, expr: &Expr, min_precedence: u8) -> String {
        let mut printer = Printer::new(self.source);
        printer.expr(expr, min_precedence);
        printer.out
    }

    fn expr(&mut self, expr: &Expr, min_precedence: u8) {
        let wrap = expr.precedence() < min_precedence;
        if wrap {
            self.out.push('(');
        }
        match self.source_text(expr) {
            Some(text) => self.spliced(expr, text),
            None => self.canonical(expr),
        }
        if wrap {
            self.out.push(')');
        }
    }

    /// Template text under the node's span, if it has a usable one. An empty
    /// span marks a placeholder, which is printed canonically.
    fn source_text(&self, expr: &Expr) -> Option<&'s str> {
        let span = expr.span.filter(|span| !span.is_empty())?;
        self.source.get(span.start as usize..span.end as usize)
    }

    // ------------------------------------------------------------------------
    // Source-preserving
    // ------------------------------------------------------------------------

    fn spliced(&mut self, expr: &Expr, text: &str) {
        if expr.is_injected_receiver() {
            self.out.push_str(THIS_DOT);
            self.out.push_str(text);
            return;
        }

        let Some(span) = expr.span else {
            return;
        };
        let mut edits = self.edits(expr);
        edits.sort_by_key(|(start, _, _)| *start);

        let mut cursor = span.start as usize;
        for (start, end, replacement) in edits {
            // Overlapping or out-of-node edits are dropped
            if start < cursor || end > span.end as usize {
                continue;
            }
            self.out.push_str(&self.source[cursor..start]);
            self.out.push_str(&replacement);
            cursor = end;
        }
        self.out.push_str(&self.source[cursor..span.end as usize]);
    }

    /// Printed children that replace their own spans in the parent's text.
    fn edits(&self, expr: &Expr) -> Vec<(usize, usize, String)> {
        let mut edits = Vec::new();
        let mut push = |child: &Expr, printed: String| {
            if let Some(span) = child.span {
                edits.push((span.start as usize, span.end as usize, printed));
            }
        };

        if let ExprKind::Object(properties) = &expr.kind {
            for property in properties {
                match property {
                    Property::KeyValue {
                        key,
                        value,
                        shorthand: true,
                    } => {
                        let key = key.expr();
                        if value.is_injected_receiver() {
                            let name = self.source_text(key).unwrap_or_default();
                            push(key, format!("{name}: {}", self.sub(value, ASSIGN)));
                        } else {
                            push(key, self.sub(key, 0));
                        }
                    }
                    Property::KeyValue { key, value, .. } => {
                        push(key.expr(), self.sub(key.expr(), 0));
                        push(value, self.sub(value, 0));
                    }
                    Property::Spread(argument) => push(argument, self.sub(argument, 0)),
                    Property::Raw(_) => {}
                }
            }
            return edits;
        }

        for child in expr.children() {
            if child.span.is_some() {
                let printed = self.sub(child, 0);
                push(child, printed);
            }
        }
        edits
    }

    // ------------------------------------------------------------------------
    // Canonical
    // ------------------------------------------------------------------------

    fn canonical(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Identifier(name) => self.out.push_str(name),
            ExprKind::This => self.out.push_str("this"),
            ExprKind::Literal(literal) => self.literal(literal),
            ExprKind::Member {
                object,
                property,
                optional,
            } => {
                self.expr(object, MEMBER);
                self.out.push_str(if *optional { "?." } else { "." });
                self.out.push_str(property);
            }
            ExprKind::Computed {
                object,
                property,
                optional,
            } => {
                self.expr(object, MEMBER);
                self.out.push_str(if *optional { "?.[" } else { "[" });
                self.expr(property, 0);
                self.out.push(']');
            }
            ExprKind::Call {
                callee,
                arguments,
                optional,
            } => {
                self.expr(callee, MEMBER);
                if *optional {
                    self.out.push_str("?.");
                }
                self.list('(', arguments, ')');
            }
            ExprKind::New { callee, arguments } => {
                self.out.push_str("new ");
                self.expr(callee, MEMBER);
                self.list('(', arguments, ')');
            }
            ExprKind::Unary { operator, argument } => {
                self.out.push_str(operator);
                let printed = self.sub(argument, UNARY);
                let word = operator.chars().all(|c| c.is_ascii_alphabetic());
                // `- -a` must not collapse into `--a`
                let clash = operator
                    .chars()
                    .last()
                    .is_some_and(|last| (last == '+' || last == '-') && printed.starts_with(last));
                if word || clash {
                    self.out.push(' ');
                }
                self.out.push_str(&printed);
            }
            ExprKind::Update {
                operator,
                prefix,
                argument,
            } => {
                if *prefix {
                    self.out.push_str(operator);
                    self.expr(argument, UNARY);
                } else {
                    self.expr(argument, MEMBER);
                    self.out.push_str(operator);
                }
            }
            ExprKind::Binary {
                left,
                operator,
                right,
            } => self.binary(left, operator, right),
            ExprKind::Assignment {
                target,
                operator,
                value,
            } => {
                self.expr(target, MEMBER);
                self.out.push(' ');
                self.out.push_str(operator);
                self.out.push(' ');
                self.expr(value, ASSIGN);
            }
            ExprKind::Sequence(expressions) => {
                for (i, e) in expressions.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(e, ASSIGN);
                }
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.expr(test, CONDITIONAL_TEST);
                self.out.push_str(" ? ");
                self.expr(consequent, ASSIGN);
                self.out.push_str(" : ");
                self.expr(alternate, ASSIGN);
            }
            ExprKind::Paren(inner) => {
                self.out.push('(');
                self.expr(inner, 0);
                self.out.push(')');
            }
            ExprKind::Object(properties) => self.object(properties),
            ExprKind::Array(elements) => {
                self.out.push('[');
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    if let Some(e) = element {
                        self.expr(e, ASSIGN);
                    }
                }
                // A trailing hole needs its own comma
                if matches!(elements.last(), Some(None)) {
                    self.out.push(',');
                }
                self.out.push(']');
            }
            ExprKind::Spread(argument) => {
                self.out.push_str("...");
                self.expr(argument, ASSIGN);
            }
            ExprKind::Arrow { params, body } => {
                self.list('(', params, ')');
                self.out.push_str(" => ");
                match body {
                    ArrowBody::Expression(body) => {
                        let printed = self.sub(body, ASSIGN);
                        if printed.starts_with('{') {
                            self.out.push('(');
                            self.out.push_str(&printed);
                            self.out.push(')');
                        } else {
                            self.out.push_str(&printed);
                        }
                    }
                    ArrowBody::Block(statements) => self.block(statements),
                }
            }
            ExprKind::Function { params, body } => {
                self.out.push_str("function ");
                self.list('(', params, ')');
                self.out.push(' ');
                self.block(body);
            }
            ExprKind::Template {
                quasis,
                expressions,
            } => {
                self.out.push('`');
                for (i, quasi) in quasis.iter().enumerate() {
                    self.out.push_str(quasi);
                    if let Some(e) = expressions.get(i) {
                        self.out.push_str("${");
                        self.expr(e, 0);
                        self.out.push('}');
                    }
                }
                self.out.push('`');
            }
            ExprKind::Pattern { text, .. } | ExprKind::Raw(text) => self.out.push_str(text),
        }
    }

    fn literal(&mut self, literal: &Literal) {
        match literal {
            Literal::String(value) => push_quoted(&mut self.out, value),
            Literal::Number(raw) => self.out.push_str(raw),
            Literal::Boolean(value) => self.out.push_str(if *value { "true" } else { "false" }),
            Literal::Null => self.out.push_str("null"),
        }
    }

    fn binary(&mut self, left: &Expr, operator: &str, right: &Expr) {
        let precedence = binary_precedence(operator);
        // `**` groups to the right, everything else to the left
        let (left_min, right_min) = if operator == "**" {
            (precedence + 1, precedence)
        } else {
            (precedence, precedence + 1)
        };
        let left_min = if mixes_nullish(operator, left) { u8::MAX } else { left_min };
        let right_min = if mixes_nullish(operator, right) { u8::MAX } else { right_min };

        self.expr(left, left_min);
        self.out.push(' ');
        self.out.push_str(operator);
        self.out.push(' ');
        self.expr(right, right_min);
    }

    fn object(&mut self, properties: &[Property]) {
        if properties.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str("{ ");
        for (i, property) in properties.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            match property {
                Property::KeyValue {
                    key,
                    value,
                    shorthand,
                } => {
                    let same_name = match (&key.expr().kind, &value.kind) {
                        (ExprKind::Identifier(k), ExprKind::Identifier(v)) => k == v,
                        _ => false,
                    };
                    match key {
                        PropertyKey::Static(key) => self.expr(key, 0),
                        PropertyKey::Computed(key) => {
                            self.out.push('[');
                            self.expr(key, ASSIGN);
                            self.out.push(']');
                        }
                    }
                    if !(*shorthand && same_name) {
                        self.out.push_str(": ");
                        self.expr(value, ASSIGN);
                    }
                }
                Property::Spread(argument) => {
                    self.out.push_str("...");
                    self.expr(argument, ASSIGN);
                }
                Property::Raw(text) => self.out.push_str(text),
            }
        }
        self.out.push_str(" }");
    }

    fn list(&mut self, open: char, items: &[Expr], close: char) {
        self.out.push(open);
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(item, ASSIGN);
        }
        self.out.push(close);
    }

    fn block(&mut self, statements: &[Stmt]) {
        if statements.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str("{ ");
        for (i, stmt) in statements.iter().enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            match stmt {
                Stmt::Expression(expr) => {
                    self.out.push_str(&print_statement_expr(expr, self.source));
                    self.out.push(';');
                }
                Stmt::Return(Some(expr)) => {
                    self.out.push_str("return ");
                    self.expr(expr, 0);
                    self.out.push(';');
                }
                Stmt::Return(None) => self.out.push_str("return;"),
                Stmt::Raw(text) => self.out.push_str(text),
            }
        }
        self.out.push_str(" }");
    }
}

/// `??` cannot share an operand with `||` or `&&` without parentheses.
fn mixes_nullish(operator: &str, operand: &Expr) -> bool {
    let ExprKind::Binary {
        operator: inner, ..
    } = &operand.kind
    else {
        return false;
    };
    let logical = |op: &str| op == "||" || op == "&&";
    (operator == "??" && logical(inner.as_str())) || (logical(operator) && inner.as_str() == "??")
}

/// Push `value` as a single-quoted string literal.
pub fn push_quoted(out: &mut String, value: &str) {
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('\'');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Property;
    use sfumato_carton::SourceRange;

    #[test]
    fn test_canonical_scaffolding() {
        let element = Expr::call(
            Expr::identifier("__vlsComponentHelper"),
            vec![
                Expr::string("div"),
                Expr::object(vec![Property::KeyValue {
                    key: PropertyKey::Static(Expr::string("props")),
                    value: Expr::object(Vec::new()),
                    shorthand: false,
                }]),
                Expr::array(Vec::new()),
            ],
        );
        insta::assert_snapshot!(
            print_expr(&element, ""),
            @"__vlsComponentHelper('div', { 'props': {} }, [])"
        );
    }

    #[test]
    fn test_string_escapes() {
        let text = Expr::string("it's\n\\ok");
        assert_eq!(print_expr(&text, ""), r"'it\'s\n\\ok'");
    }

    #[test]
    fn test_parens_where_needed() {
        // (a, b) as a conditional test
        let source = "a, b";
        let seq = Expr::with_span(
            ExprKind::Sequence(vec![
                Expr::with_span(ExprKind::Identifier("a".into()), SourceRange::new(0, 1)),
                Expr::with_span(ExprKind::Identifier("b".into()), SourceRange::new(3, 4)),
            ]),
            SourceRange::new(0, 4),
        );
        let cond = Expr::conditional(seq, Expr::boolean(true), Expr::boolean(false));
        assert_eq!(print_expr(&cond, source), "(a, b) ? true : false");

        let filtered = Expr::binary(
            Expr::array(Vec::new()),
            "||",
            Expr::conditional(Expr::identifier("x"), Expr::identifier("y"), Expr::identifier("z")),
        );
        assert_eq!(print_expr(&filtered, ""), "[] || (x ? y : z)");

        let nullish = Expr::binary(
            Expr::array(Vec::new()),
            "||",
            Expr::binary(Expr::identifier("x"), "??", Expr::identifier("y")),
        );
        assert_eq!(print_expr(&nullish, ""), "[] || (x ?? y)");
    }

    #[test]
    fn test_arrow_object_body() {
        let arrow = Expr::arrow(Vec::new(), Expr::object(Vec::new()));
        assert_eq!(print_expr(&arrow, ""), "() => ({})");
    }

    #[test]
    fn test_statement_parens() {
        assert_eq!(print_statement_expr(&Expr::object(Vec::new()), ""), "({})");
        assert_eq!(print_statement_expr(&Expr::identifier("a"), ""), "a");
    }

    #[test]
    fn test_trailing_hole() {
        let array = Expr::new(ExprKind::Array(vec![Some(Expr::identifier("a")), None]));
        assert_eq!(print_expr(&array, ""), "[a, ,]");
    }
}
