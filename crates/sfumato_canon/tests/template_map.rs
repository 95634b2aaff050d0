//! End-to-end properties of the template source map.

use sfumato_canon::{
    map_backward, map_forward, map_range_backward, map_range_forward, transform_sfc,
    transform_template, SourceMapNode, TemplateTransform, TransformOptions,
};
use sfumato_carton::SourceRange;
use sfumato_croquis::{inject_this, parse_expression, print_expr, Scope};

const TEMPLATES: &[&str] = &[
    "<template>{{ a.b.c }}</template>",
    r#"<div :title="" />"#,
    r#"<ul><li v-for="(item, i) in items" :key="item.id">{{ item.name + suffix }}</li></ul>"#,
    r#"<div v-if="ok">{{ yes }}</div><p v-else-if="maybe">x</p><span v-else>{{ no }}</span>"#,
    r#"<button @click="count++; log($event, count)" @keyup="onKey">+</button>"#,
    r#"<comp :opts="{ foo, bar: baz, [key]: 1, ...rest }" #item="{ row }">{{ row[field] }}</comp>"#,
    "<p>{{ price | currency('$', digits) }} {{ `${a} and ${b}` }} {{ cond ? x : (y, z) }}</p>",
    r#"<input v-model="form.name" :disabled="!enabled || busy" @input="e => update(e.target.value)">"#,
];

fn transform(template: &str) -> TemplateTransform {
    transform_template(template, &TransformOptions::default())
}

fn node_for(result: &TemplateTransform, from: SourceRange) -> &SourceMapNode {
    let Some(node) = result.source_map.nodes.iter().find(|node| node.from == from) else {
        panic!("Expected a node for {from:?}");
    };
    node
}

fn materialized<'a>(result: &'a TemplateTransform, range: SourceRange) -> &'a str {
    &result.materialized_text[range.as_usize()]
}

#[test]
fn test_member_chain_gets_receiver_prefix() {
    let template = "<template>{{ a.b.c }}</template>";
    let result = transform(template);

    let from = SourceRange::new(13, 18);
    assert_eq!(&template[from.as_usize()], "a.b.c");

    let node = node_for(&result, from);
    assert_eq!(node.to.len(), 10);
    assert_eq!(node.this_dot_ranges.len(), 1);
    assert_eq!(materialized(&result, node.to), "this.a.b.c");
    assert_eq!(map_forward(&result.source_map, 13), Some(node.to.start + 5));
    assert_eq!(map_backward(&result.source_map, node.to.start), Some(13));
}

#[test]
fn test_empty_bound_value() {
    let template = r#"<div :title="" />"#;
    let result = transform(template);
    assert!(result.materialized_text.contains("'title': ''"));

    let node = node_for(&result, SourceRange::empty(13));
    assert!(node.to.is_empty());
    assert_eq!(&result.materialized_text[node.to.start as usize..][..2], "''");
    assert_eq!(map_forward(&result.source_map, 13), Some(node.to.start));
}

#[test]
fn test_round_trip() {
    for template in TEMPLATES {
        let result = transform(template);
        assert!(!result.source_map.is_empty(), "no nodes for {template}");

        for node in &result.source_map.nodes {
            for offset in node.from.start..=node.from.end {
                let Some(target) = map_forward(&result.source_map, offset) else {
                    panic!("{offset} is inside {:?} but does not map", node.from);
                };
                assert!(
                    !node.this_dot_ranges.iter().any(|r| r.contains(target)),
                    "{offset} mapped into a prefix"
                );
                assert_eq!(
                    map_backward(&result.source_map, target),
                    Some(offset),
                    "round trip of {offset} in {template}"
                );
            }
        }
    }
}

#[test]
fn test_node_lengths_account_for_prefixes() {
    for template in TEMPLATES {
        let result = transform(template);
        for node in result.source_map.nodes.iter().flat_map(SourceMapNode::variants) {
            assert_eq!(
                node.to.len(),
                node.from.len() + 5 * node.this_dot_ranges.len() as u32,
                "{node:?}"
            );
            for range in &node.this_dot_ranges {
                assert_eq!(materialized(&result, *range), "this.");
            }
        }
    }
}

#[test]
fn test_mapped_text_matches() {
    // Outside prefixes, a mapped offset points at the same character
    for template in TEMPLATES {
        let result = transform(template);
        for node in &result.source_map.nodes {
            for (&from, &to) in &node.offset_mapping {
                if from == node.from.end {
                    continue;
                }
                assert_eq!(
                    template.as_bytes()[from as usize],
                    result.materialized_text.as_bytes()[to as usize],
                    "{from} -> {to} in {template}"
                );
            }
        }
    }
}

#[test]
fn test_prefix_maps_back_to_identifier() {
    let template = "<p>{{ foo }}</p>";
    let result = transform(template);
    let node = node_for(&result, SourceRange::new(6, 9));
    for offset in node.to.start..node.to.start + 5 {
        assert_eq!(map_backward(&result.source_map, offset), Some(6));
    }
}

#[test]
fn test_shorthand_expansion() {
    let template = r#"<comp :opts="{ foo }" />"#;
    let result = transform(template);
    assert!(result.materialized_text.contains("{ foo: this.foo }"));

    // The key and the rewritten value share the span of `foo`
    let node = node_for(&result, SourceRange::new(15, 18));
    assert_eq!(node.merged_nodes.len(), 1);
    assert_eq!(materialized(&result, node.to), "foo");
    assert_eq!(materialized(&result, node.merged_nodes[0].to), "this.foo");

    // `{ foo }` itself grew by more than its prefixes and is not mapped
    assert!(result
        .source_map
        .nodes
        .iter()
        .all(|node| node.from != SourceRange::new(13, 20)));
}

#[test]
fn test_range_mapping() {
    let template = "<p>{{ a.b + c }}</p>";
    let result = transform(template);
    let map = &result.source_map;

    let Some(to) = map_range_forward(map, 6, 9) else {
        panic!("Expected `a.b` to map");
    };
    assert_eq!(materialized(&result, to), "this.a.b");
    assert_eq!(map_range_backward(map, to.start, to.end), Some(SourceRange::new(6, 9)));

    let Some(to) = map_range_forward(map, 8, 9) else {
        panic!("Expected `b` to map");
    };
    assert_eq!(materialized(&result, to), "b");

    // Scaffolding has no template counterpart
    assert_eq!(map_backward(map, 0), None);
    assert_eq!(map_forward(map, 0), None);
}

#[test]
fn test_scope_correctness() {
    let Ok(expr) = parse_expression("foo", 0) else {
        panic!("Expected an expression");
    };
    assert_eq!(print_expr(&inject_this(expr.clone(), &Scope::empty()), "foo"), "this.foo");

    let scope = Scope::empty().extend(["foo"]);
    assert_eq!(print_expr(&inject_this(expr, &scope), "foo"), "foo");
}

#[test]
fn test_invalid_expression_does_not_abort() {
    let template = r#"<p :a="1 +">{{ ok }}</p>"#;
    let result = transform(template);
    assert!(result.materialized_text.contains("'a': ''"));
    assert!(result.materialized_text.contains("this.ok"));
    assert!(result
        .source_map
        .nodes
        .iter()
        .any(|node| node.from == SourceRange::new(15, 17)));
}

#[test]
fn test_sfc_offsets_are_document_offsets() {
    let text = "<script>\nexport default {}\n</script>\n\n<template>\n  <p>{{ msg }}</p>\n</template>\n";
    let result = transform_sfc(text, &TransformOptions::default());

    let Some(start) = text.find("msg") else {
        panic!("Expected msg in the document");
    };
    let from = SourceRange::from_usize(start, start + 3);
    let node = node_for(&result, from);
    assert_eq!(materialized(&result, node.to), "this.msg");
}

#[test]
fn test_source_map_json() {
    let result = transform("<p>{{ x }}</p>");
    let Ok(json) = serde_json::to_value(&result.source_map.nodes[0]) else {
        panic!("Expected the node to serialize");
    };
    assert_eq!(json["from"]["start"], 6);
    assert_eq!(json["from"]["end"], 7);
    assert!(json["offsetMapping"].is_object());
    assert!(json["offsetBackMapping"].is_object());
    assert_eq!(json["thisDotRanges"].as_array().map(Vec::len), Some(1));
    assert!(json.get("mergedNodes").is_none());
}
