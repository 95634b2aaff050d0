//! Materialization: print the synthetic tree as a script program, then
//! parse that program back.
//!
//! The re-parsed tree has ordinary, contiguous ranges in the printed text,
//! which is what editors and type checkers work with. Because printing
//! preserves structure, the re-parsed render statements line up one to one
//! with the synthetic roots.

use sfumato_croquis::{
    parse_statements, print_statement_expr, Expr, ExprKind, ExpressionError, Stmt, HELPERS,
    RENDER_HELPER,
};
use thiserror::Error;

/// Module the helper functions are imported from
pub const BRIDGE_MODULE: &str = "vue-editor-bridge";

/// Local name of the component the template belongs to
pub const COMPONENT_BINDING: &str = "__Component";

/// The printed program failed to read back as the program that was printed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaterializeError {
    #[error("printed program does not parse: {0}")]
    Reparse(#[from] ExpressionError),

    #[error("printed program has no render callback")]
    MissingRenderCallback,

    #[error("render callback has {found} statements, expected {expected}")]
    StatementCount { expected: usize, found: usize },
}

/// A printed program and its re-parsed render statements
#[derive(Debug, Clone)]
pub struct Materialized {
    pub text: String,
    /// One expression per synthetic root, with spans into `text`
    pub roots: Vec<Expr>,
}

/// Print `roots` as a render program. Spans in `roots` point into `source`.
///
/// ```text
/// import __Component from "./component.vue";
/// import { __vlsRenderHelper, ... } from "vue-editor-bridge";
/// __vlsRenderHelper(__Component, function () {
///   <root>;
/// });
/// ```
pub fn print_program(roots: &[Expr], source: &str, component_path: &str) -> String {
    let mut out = String::with_capacity(source.len() * 2 + 256);

    out.push_str("import ");
    out.push_str(COMPONENT_BINDING);
    out.push_str(" from \"");
    push_escaped(&mut out, component_path);
    out.push_str("\";\n");

    out.push_str("import { ");
    out.push_str(&HELPERS.join(", "));
    out.push_str(" } from \"");
    out.push_str(BRIDGE_MODULE);
    out.push_str("\";\n");

    out.push_str(RENDER_HELPER);
    out.push('(');
    out.push_str(COMPONENT_BINDING);
    out.push_str(", function () {\n");
    for root in roots {
        out.push_str("  ");
        out.push_str(&print_statement_expr(root, source));
        out.push_str(";\n");
    }
    out.push_str("});\n");
    out
}

/// Parse a printed program and return the statements of its render
/// callback.
pub fn reparse(text: &str, expected: usize) -> Result<Vec<Expr>, MaterializeError> {
    let statements = parse_statements(text, 0)?;

    let body = statements
        .into_iter()
        .find_map(render_callback_body)
        .ok_or(MaterializeError::MissingRenderCallback)?;

    let roots: Vec<Expr> = body
        .into_iter()
        .filter_map(|stmt| match stmt {
            Stmt::Expression(expr) => Some(expr),
            Stmt::Return(_) | Stmt::Raw(_) => None,
        })
        .collect();

    if roots.len() != expected {
        return Err(MaterializeError::StatementCount {
            expected,
            found: roots.len(),
        });
    }
    Ok(roots)
}

/// Print `roots` and parse the result back.
pub fn materialize(
    roots: &[Expr],
    source: &str,
    component_path: &str,
) -> Result<Materialized, MaterializeError> {
    let text = print_program(roots, source, component_path);
    let roots = reparse(&text, roots.len())?;
    Ok(Materialized { text, roots })
}

/// Body of `__vlsRenderHelper(__Component, function () { ... })`
fn render_callback_body(stmt: Stmt) -> Option<Vec<Stmt>> {
    let Stmt::Expression(Expr {
        kind: ExprKind::Call {
            callee, arguments, ..
        },
        ..
    }) = stmt
    else {
        return None;
    };
    if !matches!(&callee.kind, ExprKind::Identifier(name) if name.as_str() == RENDER_HELPER) {
        return None;
    }
    arguments.into_iter().find_map(|argument| match argument.kind {
        ExprKind::Function { body, .. } => Some(body),
        _ => None,
    })
}

fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfumato_armature::parse;
    use sfumato_croquis::{transform, Scope};

    fn roots(template: &str) -> Vec<Expr> {
        let root = parse(template).root;
        transform(&root, template, &Scope::template_root(std::iter::empty::<&str>()))
    }

    #[test]
    fn test_print_program() {
        let template = "<p>{{ msg }}</p>";
        insta::assert_snapshot!(
            print_program(&roots(template), template, "./Hello.vue"),
            @r#"
        import __Component from "./Hello.vue";
        import { __vlsRenderHelper, __vlsComponentHelper, __vlsIterationHelper, __vlsListenerHelper } from "vue-editor-bridge";
        __vlsRenderHelper(__Component, function () {
          __vlsComponentHelper('p', { props: {}, on: {}, directives: [] }, [this.msg]);
        });
        "#
        );
    }

    #[test]
    fn test_escaped_component_path() {
        let text = print_program(&[], "", r#"./we"ird.vue"#);
        assert!(text.starts_with(r#"import __Component from "./we\"ird.vue";"#));
    }

    #[test]
    fn test_materialize_spans_point_into_printed_text() {
        let template = "<p>{{ msg }}</p>";
        let Ok(materialized) = materialize(&roots(template), template, "./Hello.vue") else {
            panic!("Expected the program to read back");
        };
        assert_eq!(materialized.roots.len(), 1);

        let Some(span) = materialized.roots[0].span else {
            panic!("Expected a span on the re-parsed root");
        };
        let printed = &materialized.text[span.as_usize()];
        assert!(printed.starts_with("__vlsComponentHelper('p'"));
        assert!(printed.ends_with("[this.msg])"));
    }

    #[test]
    fn test_object_root_is_wrapped() {
        let object = Expr::object(Vec::new());
        let text = print_program(std::slice::from_ref(&object), "", "./c.vue");
        assert!(text.contains("  ({});\n"));

        let Ok(roots) = reparse(&text, 1) else {
            panic!("Expected the program to read back");
        };
        assert!(matches!(roots[0].kind, ExprKind::Paren(_)));
    }

    #[test]
    fn test_reparse_errors() {
        assert!(matches!(
            reparse("foo(", 0),
            Err(MaterializeError::Reparse(_))
        ));
        assert!(matches!(
            reparse("foo();", 0),
            Err(MaterializeError::MissingRenderCallback)
        ));
        assert_eq!(
            reparse("__vlsRenderHelper(__Component, function () { a; b; });", 1).err(),
            Some(MaterializeError::StatementCount {
                expected: 1,
                found: 2
            })
        );
    }
}
