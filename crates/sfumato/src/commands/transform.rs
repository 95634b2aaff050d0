//! Transform command - Print the materialized template script and its source map

use clap::Args;
use sfumato::canon::{transform_sfc, transform_template, TemplateTransform, TransformOptions};
use std::fmt::Write;
use std::path::{Path, PathBuf};

use super::{print_json, read_source, CliError, Format};

#[derive(Args)]
pub struct TransformArgs {
    /// SFC file (or bare template markup with --template)
    pub file: PathBuf,

    /// Treat the file as template markup rather than a whole SFC
    #[arg(long)]
    pub template: bool,

    /// Import specifier of the component (overrides the config file)
    #[arg(long)]
    pub component_path: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

pub fn run(args: TransformArgs, options: &TransformOptions) -> Result<(), CliError> {
    let mut options = options.clone();
    if args.component_path.is_some() {
        options.component_path = args.component_path;
    }
    let (source, result) = load(&args.file, args.template, &options)?;

    match args.format {
        Format::Json => print_json(&result),
        Format::Text => {
            print!("{}", render_text(&source, &result));
            Ok(())
        }
    }
}

/// Read `file` and run the transform that fits it
pub(crate) fn load(
    file: &Path,
    template: bool,
    options: &TransformOptions,
) -> Result<(String, TemplateTransform), CliError> {
    let source = read_source(file)?;
    let result = if template {
        transform_template(&source, options)
    } else {
        transform_sfc(&source, options)
    };
    tracing::debug!(
        file = %file.display(),
        nodes = result.source_map.nodes.len(),
        "transformed template"
    );
    Ok((source, result))
}

fn render_text(source: &str, result: &TemplateTransform) -> String {
    let mut out = result.materialized_text.clone();
    out.push_str("\n// source map\n");
    for node in &result.source_map.nodes {
        let from = node.from.slice(source).unwrap_or_default();
        let to = node.to.slice(&result.materialized_text).unwrap_or_default();
        let _ = writeln!(
            out,
            "// {}..{} {:?} -> {}..{} {:?}",
            node.from.start, node.from.end, from, node.to.start, node.to.end, to
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text() {
        let source = "<p>{{ msg }}</p>";
        let result = transform_template(source, &TransformOptions::default());
        let text = render_text(source, &result);

        assert!(text.starts_with(&result.materialized_text));
        let Some(line) = text.lines().find(|line| line.starts_with("// 6..9 ")) else {
            panic!("Expected a line for `msg`:\n{text}");
        };
        assert!(line.ends_with("\"this.msg\""), "{line}");
    }
}
