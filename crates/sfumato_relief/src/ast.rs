//! Vue template AST node types.
//!
//! Nodes are plain owned values. Every `loc` is a byte span in the template
//! text handed to the parser; for a whitespace-blanked template document that
//! is also a span in the original SFC.

use serde::Serialize;
use sfumato_carton::{SourceRange, String};

/// Node type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum NodeType {
    Root = 0,
    Element = 1,
    Text = 2,
    Comment = 3,
    SimpleExpression = 4,
    Interpolation = 5,
    Attribute = 6,
    Directive = 7,
}

/// Root AST node
#[derive(Debug, Clone, Default, Serialize)]
pub struct RootNode {
    pub children: Vec<TemplateChildNode>,
    pub loc: SourceRange,
}

impl RootNode {
    pub fn node_type(&self) -> NodeType {
        NodeType::Root
    }
}

// ============================================================================
// Template Nodes
// ============================================================================

/// All template child node types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum TemplateChildNode {
    Element(Box<ElementNode>),
    Text(TextNode),
    Comment(CommentNode),
    Interpolation(InterpolationNode),
}

impl TemplateChildNode {
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Element(_) => NodeType::Element,
            Self::Text(_) => NodeType::Text,
            Self::Comment(_) => NodeType::Comment,
            Self::Interpolation(_) => NodeType::Interpolation,
        }
    }

    pub fn loc(&self) -> SourceRange {
        match self {
            Self::Element(n) => n.loc,
            Self::Text(n) => n.loc,
            Self::Comment(n) => n.loc,
            Self::Interpolation(n) => n.loc,
        }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Text made only of whitespace carries nothing worth checking
    pub fn is_whitespace_text(&self) -> bool {
        matches!(self, Self::Text(text) if text.content.trim().is_empty())
    }
}

/// Element node
#[derive(Debug, Clone, Serialize)]
pub struct ElementNode {
    /// Lowercased tag name
    pub tag: String,
    pub props: Vec<PropNode>,
    pub children: Vec<TemplateChildNode>,
    pub is_self_closing: bool,
    /// Whole element, start tag through end tag
    pub loc: SourceRange,
    /// Just the start tag, `<` through `>`
    pub start_tag_loc: SourceRange,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>, loc: SourceRange) -> Self {
        Self {
            tag: tag.into(),
            props: Vec::new(),
            children: Vec::new(),
            is_self_closing: false,
            loc,
            start_tag_loc: loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Element
    }

    /// Iterate over the directives on this element, in source order
    pub fn directives(&self) -> impl Iterator<Item = &DirectiveNode> {
        self.props.iter().filter_map(PropNode::as_directive)
    }

    /// Find the first directive whose normalized name is one of `names`
    pub fn find_directive(&self, names: &[&str]) -> Option<&DirectiveNode> {
        self.directives()
            .find(|dir| names.iter().any(|name| dir.name == *name))
    }

    /// Whether this element carries a directive named `name`
    pub fn has_directive(&self, name: &str) -> bool {
        self.directives().any(|dir| dir.name == name)
    }
}

/// Prop node (attribute or directive)
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum PropNode {
    Attribute(AttributeNode),
    Directive(DirectiveNode),
}

impl PropNode {
    pub fn loc(&self) -> SourceRange {
        match self {
            Self::Attribute(n) => n.loc,
            Self::Directive(n) => n.loc,
        }
    }

    pub fn as_directive(&self) -> Option<&DirectiveNode> {
        match self {
            Self::Directive(dir) => Some(dir),
            Self::Attribute(_) => None,
        }
    }
}

/// Attribute node
#[derive(Debug, Clone, Serialize)]
pub struct AttributeNode {
    pub name: String,
    pub name_loc: SourceRange,
    /// Value without its surrounding quotes
    pub value: Option<TextNode>,
    pub loc: SourceRange,
}

impl AttributeNode {
    pub fn new(name: impl Into<String>, loc: SourceRange) -> Self {
        Self {
            name: name.into(),
            name_loc: loc,
            value: None,
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Attribute
    }
}

/// Directive argument
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum DirectiveArg {
    /// `v-bind:title`, `@click`
    Static(SimpleExpressionNode),
    /// `v-bind:[key]`; the node holds the text between the brackets
    Dynamic(SimpleExpressionNode),
}

impl DirectiveArg {
    pub fn expression(&self) -> &SimpleExpressionNode {
        match self {
            Self::Static(exp) | Self::Dynamic(exp) => exp,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }
}

/// Directive node (v-if, v-for, v-bind, etc.)
#[derive(Debug, Clone, Serialize)]
pub struct DirectiveNode {
    /// Normalized directive name without prefix (e.g., "if", "for", "bind")
    pub name: String,
    /// Raw attribute name including shorthand (e.g., "@click", ":class")
    pub raw_name: String,
    /// Directive expression, without the surrounding quotes
    pub exp: Option<SimpleExpressionNode>,
    /// Directive argument (e.g., "click" in @click)
    pub arg: Option<DirectiveArg>,
    /// Directive modifiers (e.g., ["stop", "prevent"] in @click.stop.prevent)
    pub modifiers: Vec<String>,
    pub loc: SourceRange,
}

impl DirectiveNode {
    pub fn new(name: impl Into<String>, raw_name: impl Into<String>, loc: SourceRange) -> Self {
        Self {
            name: name.into(),
            raw_name: raw_name.into(),
            exp: None,
            arg: None,
            modifiers: Vec::new(),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Directive
    }

    /// The directive value, if it is present and not blank
    pub fn value(&self) -> Option<&SimpleExpressionNode> {
        self.exp.as_ref().filter(|exp| !exp.is_blank())
    }
}

/// Text node
#[derive(Debug, Clone, Serialize)]
pub struct TextNode {
    pub content: String,
    pub loc: SourceRange,
}

impl TextNode {
    pub fn new(content: impl Into<String>, loc: SourceRange) -> Self {
        Self {
            content: content.into(),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Text
    }
}

/// Comment node
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    pub content: String,
    pub loc: SourceRange,
}

impl CommentNode {
    pub fn new(content: impl Into<String>, loc: SourceRange) -> Self {
        Self {
            content: content.into(),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Comment
    }
}

/// Interpolation node ({{ expr }})
#[derive(Debug, Clone, Serialize)]
pub struct InterpolationNode {
    /// Everything between the delimiters, surrounding whitespace included
    pub content: SimpleExpressionNode,
    pub loc: SourceRange,
}

impl InterpolationNode {
    pub fn node_type(&self) -> NodeType {
        NodeType::Interpolation
    }
}

// ============================================================================
// Expression Nodes
// ============================================================================

/// Raw script-language source text with its span.
///
/// The template parser does not parse expressions; that happens later,
/// against the script grammar, once it is known what the text should be
/// (an expression, a parameter list, a statement list, an iteration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleExpressionNode {
    pub content: String,
    pub loc: SourceRange,
}

impl SimpleExpressionNode {
    pub fn new(content: impl Into<String>, loc: SourceRange) -> Self {
        Self {
            content: content.into(),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::SimpleExpression
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}
