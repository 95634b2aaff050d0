//! # sfumato_canon
//!
//! Canon - the script a template is checked as.
//!
//! [`transform_template`] runs the template pipeline end to end: parse the
//! template, transform it into a synthetic script tree, materialize that
//! tree as a program and build the [`TemplateSourceMap`] between the two
//! texts.
//!
//! ```text
//! template text
//!      │ sfumato_armature::parse
//!      ▼
//! template AST ── sfumato_croquis::transform ──▶ synthetic tree
//!                                                    │ print + re-parse
//!                                                    ▼
//!                      source map ◀── lockstep ── materialized tree
//! ```
//!
//! Every function here is total. Anomalies degrade the result (an empty
//! map, a dropped directive) and are logged, never returned.

pub mod materialize;
pub mod source_map;

use serde::{Deserialize, Serialize};
use sfumato_atelier_sfc::{extract_regions, single_kind_document, BlockKind, DocumentMeta};
use sfumato_carton::SourceRange;
use sfumato_croquis::{transform, Scope};

pub use materialize::{
    materialize, print_program, reparse, MaterializeError, Materialized, BRIDGE_MODULE,
    COMPONENT_BINDING,
};
pub use source_map::{build_source_map, SourceMapNode, TemplateSourceMap};

/// Import specifier of the component when nothing else is known
pub const DEFAULT_COMPONENT_PATH: &str = "./component.vue";

/// Options for [`transform_template`] and [`transform_sfc`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOptions {
    /// Import specifier of `__Component`
    pub component_path: Option<String>,
    /// Names never read off the component instance, on top of the runtime
    /// globals (`$t`, `$route`, ...)
    pub extra_globals: Vec<String>,
}

impl TransformOptions {
    fn component_path(&self) -> &str {
        self.component_path
            .as_deref()
            .unwrap_or(DEFAULT_COMPONENT_PATH)
    }
}

/// A materialized template and its source map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateTransform {
    pub materialized_text: String,
    pub source_map: TemplateSourceMap,
}

/// Transform template markup into a render program.
///
/// Offsets in the source map's `from` spans are offsets into `text`.
pub fn transform_template(text: &str, options: &TransformOptions) -> TemplateTransform {
    let parsed = sfumato_armature::parse(text);
    if !parsed.errors.is_empty() {
        tracing::debug!(errors = parsed.errors.len(), "template parsed with errors");
    }

    let scope = Scope::template_root(&options.extra_globals);
    let roots = transform(&parsed.root, text, &scope);
    let printed = print_program(&roots, text, options.component_path());

    match reparse(&printed, roots.len()) {
        Ok(materialized) => {
            let source_map = build_source_map(&roots, &materialized);
            tracing::debug!(nodes = source_map.nodes.len(), "materialized template");
            TemplateTransform {
                materialized_text: printed,
                source_map,
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "materialized template does not read back");
            TemplateTransform {
                materialized_text: printed,
                source_map: TemplateSourceMap::default(),
            }
        }
    }
}

/// Transform the `<template>` block of a whole SFC document.
///
/// The template is transformed in place inside the whitespace-blanked
/// document, so source map offsets are offsets into `text`. A template in
/// another language, or an empty one, gives an empty result.
pub fn transform_sfc(text: &str, options: &TransformOptions) -> TemplateTransform {
    let sfc = extract_regions(text);
    let document = single_kind_document(
        &DocumentMeta::default(),
        text,
        &sfc.regions,
        BlockKind::Template,
    );

    if document.language_id.as_str() != BlockKind::Template.default_language()
        || document.text.trim().is_empty()
    {
        return TemplateTransform::default();
    }

    let mut options = options.clone();
    if options.component_path.is_none() {
        options.component_path = sfc.imported_scripts.first().map(|src| {
            src.strip_suffix(".ts")
                .unwrap_or(src.as_str())
                .to_string()
        });
    }
    transform_template(&document.text, &options)
}

/// Template offset to materialized offset, `None` outside any mapped node.
pub fn map_forward(map: &TemplateSourceMap, offset: u32) -> Option<u32> {
    map.map_forward(offset)
}

/// Materialized offset to template offset, `None` outside any mapped node.
pub fn map_backward(map: &TemplateSourceMap, offset: u32) -> Option<u32> {
    map.map_backward(offset)
}

/// Template span to materialized span; the span must lie inside one node.
pub fn map_range_forward(map: &TemplateSourceMap, start: u32, end: u32) -> Option<SourceRange> {
    map.map_range_forward(start, end)
}

/// Materialized span to template span; the span must lie inside one node.
pub fn map_range_backward(map: &TemplateSourceMap, start: u32, end: u32) -> Option<SourceRange> {
    map.map_range_backward(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_json() {
        let Ok(options) = serde_json::from_str::<TransformOptions>(
            r#"{ "componentPath": "./Foo.vue", "extraGlobals": ["$t"] }"#,
        ) else {
            panic!("Expected options to deserialize");
        };
        assert_eq!(options.component_path.as_deref(), Some("./Foo.vue"));
        assert_eq!(options.extra_globals, vec!["$t".to_string()]);

        let Ok(options) = serde_json::from_str::<TransformOptions>("{}") else {
            panic!("Expected defaults");
        };
        assert_eq!(options, TransformOptions::default());
        assert_eq!(options.component_path(), DEFAULT_COMPONENT_PATH);
    }

    #[test]
    fn test_extra_globals_stay_bare() {
        let options = TransformOptions {
            extra_globals: vec!["$t".to_string()],
            ..Default::default()
        };
        let result = transform_template("<p>{{ $t('hi') + other }}</p>", &options);
        assert!(result.materialized_text.contains("[$t('hi') + this.other]"));
    }

    #[test]
    fn test_sfc_component_path_from_imported_script() {
        let text = "<template>\n  <p>{{ a }}</p>\n</template>\n<script src=\"./Foo.ts\"></script>\n";
        let result = transform_sfc(text, &TransformOptions::default());
        assert!(result
            .materialized_text
            .starts_with("import __Component from \"./Foo\";"));
    }

    #[test]
    fn test_sfc_non_html_template() {
        let text = "<template lang=\"pug\">\np {{ a }}\n</template>\n";
        assert_eq!(
            transform_sfc(text, &TransformOptions::default()),
            TemplateTransform::default()
        );
    }
}
