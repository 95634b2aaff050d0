//! Source map between template text and materialized script text.
//!
//! The synthetic tree (spans into the template) and the re-parsed tree
//! (spans into the printed program) are walked together. Every synthetic
//! node with a span yields a [`SourceMapNode`] pairing the two spans, with
//! per-offset tables in both directions.
//!
//! The only text the materialized side adds inside a mapped node is the
//! `this.` prefix of rewritten identifiers, so each node satisfies
//! `to.len() == from.len() + 5 * this_dot_ranges.len()`. Nodes that do not
//! (a shorthand property expanded to `key: this.key`) are skipped; their
//! descendants are still mapped.

use std::collections::BTreeMap;

use serde::Serialize;
use sfumato_carton::SourceRange;
use sfumato_croquis::{Expr, ExprKind, THIS_DOT};

const THIS_DOT_LEN: u32 = THIS_DOT.len() as u32;

/// Correspondence between one template span and one materialized span
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapNode {
    /// Span in the template
    pub from: SourceRange,
    /// Span in the materialized text
    pub to: SourceRange,
    /// Template offset to materialized offset, for every offset of `from`
    /// with the end included
    pub offset_mapping: BTreeMap<u32, u32>,
    /// Materialized offset to template offset, for every offset of `to`
    /// with the end included
    pub offset_back_mapping: BTreeMap<u32, u32>,
    /// `this.` prefixes inside `to` that have no template counterpart
    pub this_dot_ranges: Vec<SourceRange>,
    /// Other nodes for the same `from` span
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub merged_nodes: Vec<SourceMapNode>,
}

impl SourceMapNode {
    /// Build the offset tables for `from` and `to`.
    ///
    /// Returns `None` when the span lengths do not account for exactly the
    /// given prefixes. An empty `from` maps to the empty span at `to.start`.
    pub fn new(from: SourceRange, to: SourceRange, this_dot_ranges: Vec<SourceRange>) -> Option<Self> {
        if from.is_empty() {
            if !this_dot_ranges.is_empty() {
                return None;
            }
            let to = SourceRange::empty(to.start);
            return Some(Self {
                from,
                to,
                offset_mapping: BTreeMap::from([(from.start, to.start)]),
                offset_back_mapping: BTreeMap::from([(to.start, from.start)]),
                this_dot_ranges,
                merged_nodes: Vec::new(),
            });
        }

        let added = THIS_DOT_LEN * this_dot_ranges.len() as u32;
        if to.len() != from.len() + added || this_dot_ranges.iter().any(|r| !to.covers(*r)) {
            return None;
        }

        let in_prefix = |offset: u32| this_dot_ranges.iter().any(|r| r.contains(offset));

        let mut offset_mapping = BTreeMap::new();
        let mut offset_back_mapping = BTreeMap::new();
        let mut source = from.start;
        for target in to.start..=to.end {
            if in_prefix(target) {
                continue;
            }
            offset_mapping.insert(source, target);
            offset_back_mapping.insert(target, source);
            source += 1;
        }

        // A position inside a prefix resolves to the identifier after it
        for range in &this_dot_ranges {
            let Some(&after) = offset_back_mapping.get(&range.end) else {
                return None;
            };
            for target in range.start..range.end {
                offset_back_mapping.insert(target, after);
            }
        }

        Some(Self {
            from,
            to,
            offset_mapping,
            offset_back_mapping,
            this_dot_ranges,
            merged_nodes: Vec::new(),
        })
    }

    /// This node followed by its merged nodes.
    pub fn variants(&self) -> impl Iterator<Item = &SourceMapNode> {
        std::iter::once(self).chain(self.merged_nodes.iter())
    }

    /// Map a template offset, inclusive of `from.end`.
    pub fn forward(&self, offset: u32) -> Option<u32> {
        self.offset_mapping.get(&offset).copied()
    }

    /// Map a materialized offset, inclusive of `to.end`.
    pub fn backward(&self, offset: u32) -> Option<u32> {
        self.offset_back_mapping.get(&offset).copied()
    }
}

/// All mapped nodes of one materialized template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateSourceMap {
    /// In pre-order of the synthetic tree; no two share a `from` span
    pub nodes: Vec<SourceMapNode>,
}

impl TemplateSourceMap {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Narrowest node whose `from` contains `offset`, end included.
    fn narrowest_from(&self, contains: impl Fn(SourceRange) -> bool) -> Option<&SourceMapNode> {
        self.nodes
            .iter()
            .filter(|node| contains(node.from))
            .min_by_key(|node| node.from.len())
    }

    /// Narrowest node or merged node whose `to` satisfies `contains`.
    fn narrowest_to(&self, contains: impl Fn(SourceRange) -> bool) -> Option<&SourceMapNode> {
        self.nodes
            .iter()
            .flat_map(SourceMapNode::variants)
            .filter(|node| contains(node.to))
            .min_by_key(|node| node.to.len())
    }

    /// Template offset to materialized offset.
    pub fn map_forward(&self, offset: u32) -> Option<u32> {
        self.narrowest_from(|from| from.contains_inclusive(offset))?
            .forward(offset)
    }

    /// Materialized offset to template offset.
    pub fn map_backward(&self, offset: u32) -> Option<u32> {
        self.narrowest_to(|to| to.contains_inclusive(offset))?
            .backward(offset)
    }

    /// Map a template span that lies inside one node. The node's edges map
    /// to the edges of its materialized span, so a whole identifier maps to
    /// its `this.` prefix as well.
    pub fn map_range_forward(&self, start: u32, end: u32) -> Option<SourceRange> {
        let span = SourceRange::new(start, end);
        let node = self.narrowest_from(|from| from.covers(span))?;
        let start = if start == node.from.start {
            node.to.start
        } else {
            node.forward(start)?
        };
        let end = if end == node.from.end {
            node.to.end
        } else {
            node.forward(end)?
        };
        Some(SourceRange::new(start, end))
    }

    /// Map a materialized span that lies inside one node back into the
    /// template.
    pub fn map_range_backward(&self, start: u32, end: u32) -> Option<SourceRange> {
        let span = SourceRange::new(start, end);
        let node = self.narrowest_to(|to| to.covers(span))?;
        let start = if start == node.to.start {
            node.from.start
        } else {
            node.backward(start)?
        };
        let end = if end == node.to.end {
            node.from.end
        } else {
            node.backward(end)?
        };
        Some(SourceRange::new(start, end))
    }
}

/// Walk the synthetic roots and their materialized counterparts together
/// and collect the mapped nodes.
pub fn build_source_map(synthetic: &[Expr], materialized: &[Expr]) -> TemplateSourceMap {
    let mut builder = Builder::default();
    if synthetic.len() == materialized.len() {
        for (s, m) in synthetic.iter().zip(materialized) {
            builder.walk(s, m);
        }
    } else {
        tracing::debug!(
            synthetic = synthetic.len(),
            materialized = materialized.len(),
            "root count mismatch, nothing mapped"
        );
    }
    builder.finish()
}

#[derive(Default)]
struct Builder {
    nodes: Vec<SourceMapNode>,
}

impl Builder {
    /// Map `synthetic` and its descendants. Returns the `this.` ranges
    /// inside the materialized subtree.
    fn walk(&mut self, synthetic: &Expr, materialized: &Expr) -> Vec<SourceRange> {
        let materialized = skip_parens(synthetic, materialized);

        // Kept verbatim; its inside was never rewritten or annotated
        if matches!(synthetic.kind, ExprKind::Raw(_)) {
            return Vec::new();
        }
        if std::mem::discriminant(&synthetic.kind) != std::mem::discriminant(&materialized.kind) {
            tracing::debug!(
                from = ?synthetic.span,
                to = ?materialized.span,
                "node kinds differ, subtree not mapped"
            );
            return Vec::new();
        }

        // Reserve the pre-order slot before the descendants push theirs
        let slot = self.nodes.len();
        let this_dot_ranges = if synthetic.is_injected_receiver() {
            materialized
                .span
                .map(|to| vec![SourceRange::new(to.start, to.start + THIS_DOT_LEN)])
                .unwrap_or_default()
        } else {
            self.walk_children(synthetic, materialized)
        };

        if let (Some(from), Some(to)) = (synthetic.span, materialized.span) {
            if let Some(node) = SourceMapNode::new(from, to, this_dot_ranges.clone()) {
                self.nodes.insert(slot, node);
            }
        }
        this_dot_ranges
    }

    fn walk_children(&mut self, synthetic: &Expr, materialized: &Expr) -> Vec<SourceRange> {
        let s = synthetic.children();
        let m = materialized.children();
        if s.len() != m.len() {
            tracing::debug!(
                from = ?synthetic.span,
                to = ?materialized.span,
                "child counts differ, subtree not mapped"
            );
            return Vec::new();
        }
        s.iter()
            .zip(m.iter())
            .flat_map(|(s, m)| self.walk(s, m))
            .collect()
    }

    /// Fold nodes sharing a `from` span into the first of them.
    fn finish(self) -> TemplateSourceMap {
        let mut nodes: Vec<SourceMapNode> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes {
            match nodes.iter_mut().find(|kept| kept.from == node.from) {
                Some(kept) => kept.merged_nodes.push(node),
                None => nodes.push(node),
            }
        }
        TemplateSourceMap { nodes }
    }
}

/// Parentheses added by the printer exist only on the materialized side.
fn skip_parens<'m>(synthetic: &Expr, mut materialized: &'m Expr) -> &'m Expr {
    if matches!(synthetic.kind, ExprKind::Paren(_)) {
        return materialized;
    }
    while let ExprKind::Paren(inner) = &materialized.kind {
        materialized = inner;
    }
    materialized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_node() {
        let Some(node) = SourceMapNode::new(SourceRange::new(3, 6), SourceRange::new(10, 13), Vec::new())
        else {
            panic!("Expected a node");
        };
        assert_eq!(node.forward(3), Some(10));
        assert_eq!(node.forward(6), Some(13));
        assert_eq!(node.backward(11), Some(4));
        assert_eq!(node.forward(7), None);
    }

    #[test]
    fn test_this_dot_prefix() {
        // `a.b` at 0..3 printed as `this.a.b` at 20..28
        let Some(node) = SourceMapNode::new(
            SourceRange::new(0, 3),
            SourceRange::new(20, 28),
            vec![SourceRange::new(20, 25)],
        ) else {
            panic!("Expected a node");
        };
        assert_eq!(node.forward(0), Some(25));
        assert_eq!(node.forward(3), Some(28));
        for inside in 20..25 {
            assert_eq!(node.backward(inside), Some(0));
        }
        assert_eq!(node.backward(26), Some(1));
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        assert!(SourceMapNode::new(SourceRange::new(0, 3), SourceRange::new(0, 4), Vec::new()).is_none());
        assert!(SourceMapNode::new(
            SourceRange::new(0, 3),
            SourceRange::new(0, 8),
            vec![SourceRange::new(10, 15)],
        )
        .is_none());
    }

    #[test]
    fn test_empty_from() {
        let Some(node) = SourceMapNode::new(SourceRange::empty(13), SourceRange::new(40, 42), Vec::new())
        else {
            panic!("Expected a node");
        };
        assert_eq!(node.to, SourceRange::empty(40));
        assert_eq!(node.forward(13), Some(40));
        assert_eq!(node.backward(40), Some(13));
    }

    #[test]
    fn test_narrowest_node_wins() {
        let outer = SourceMapNode::new(SourceRange::new(0, 10), SourceRange::new(100, 115), vec![
            SourceRange::new(100, 105),
        ]);
        let inner = SourceMapNode::new(SourceRange::new(0, 1), SourceRange::new(100, 106), vec![
            SourceRange::new(100, 105),
        ]);
        let (Some(outer), Some(inner)) = (outer, inner) else {
            panic!("Expected nodes");
        };
        let map = TemplateSourceMap {
            nodes: vec![outer, inner],
        };
        assert_eq!(map.map_forward(1), Some(106));
        assert_eq!(map.map_forward(10), Some(115));
        assert_eq!(map.map_forward(11), None);
        assert_eq!(map.map_backward(102), Some(0));
        assert_eq!(map.map_backward(99), None);

        assert_eq!(map.map_range_forward(0, 1), Some(SourceRange::new(100, 106)));
        assert_eq!(map.map_range_forward(2, 10), Some(SourceRange::new(107, 115)));
        assert_eq!(map.map_range_backward(100, 106), Some(SourceRange::new(0, 1)));
        assert_eq!(map.map_range_forward(5, 12), None);
    }

    #[test]
    fn test_walk_skips_printer_parens() {
        let synthetic = Expr::with_span(ExprKind::Identifier("a".into()), SourceRange::new(4, 5));
        let materialized = Expr::with_span(
            ExprKind::Paren(Box::new(Expr::with_span(
                ExprKind::Identifier("a".into()),
                SourceRange::new(31, 32),
            ))),
            SourceRange::new(30, 33),
        );
        let map = build_source_map(&[synthetic], &[materialized]);
        assert_eq!(map.nodes.len(), 1);
        assert_eq!(map.nodes[0].to, SourceRange::new(31, 32));
    }

    #[test]
    fn test_merged_nodes() {
        let mut builder = Builder::default();
        for to in [SourceRange::new(10, 13), SourceRange::new(15, 23)] {
            let ranges = if to.len() > 3 {
                vec![SourceRange::new(to.start, to.start + 5)]
            } else {
                Vec::new()
            };
            if let Some(node) = SourceMapNode::new(SourceRange::new(2, 5), to, ranges) {
                builder.nodes.push(node);
            }
        }
        let map = builder.finish();
        assert_eq!(map.nodes.len(), 1);
        assert_eq!(map.nodes[0].merged_nodes.len(), 1);
        assert_eq!(map.map_backward(16), Some(2));
        assert_eq!(map.map_backward(11), Some(3));
    }
}
