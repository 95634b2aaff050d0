//! Vue template parser.
//!
//! Consumes the [`Scanner`] token stream and builds a `sfumato_relief`
//! [`RootNode`]. Parsing never stops early: structural problems are collected
//! into [`ParseResult::errors`] and the tree is closed off as well as the
//! input allows.
//!
//! Expression text (interpolations, directive values, dynamic arguments) is
//! kept raw with its byte span. It is parsed against the script grammar
//! later, once the consumer knows what shape it expects.

use sfumato_carton::{SourceRange, String};
use sfumato_relief::{
    AttributeNode, CommentNode, DirectiveArg, DirectiveNode, ElementNode, InterpolationNode,
    PropNode, RootNode, SimpleExpressionNode, TemplateChildNode, TemplateParseError, TextNode,
};

use crate::scanner::{Scanner, Token, TokenType};

/// Elements that never have children or an end tag
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Result of [`parse`]
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub root: RootNode,
    pub errors: Vec<TemplateParseError>,
}

/// Parse template markup into an AST.
pub fn parse(source: &str) -> ParseResult {
    let mut parser = Parser::new(source);
    let mut scanner = Scanner::new(source);
    loop {
        let token = scanner.next_token();
        if token.kind == TokenType::Eos {
            break;
        }
        parser.on_token(token);
    }
    parser.finish()
}

/// A split directive attribute name, e.g. `v-on:click.stop` or `:[key]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveName<'a> {
    /// Normalized name: `bind`, `on`, `slot`, `if`, `my-directive`, ...
    pub name: &'a str,
    pub arg: Option<DirectiveNameArg<'a>>,
    pub modifiers: Vec<&'a str>,
}

/// Argument part of a directive name. Offsets are relative to the raw name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveNameArg<'a> {
    /// Argument text, without brackets when dynamic
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    pub dynamic: bool,
}

/// Split a raw attribute name into directive parts.
///
/// Returns `None` for plain attributes. Shorthands map as `:` and `.` to
/// `bind` (`.` adds the `prop` modifier), `@` to `on` and `#` to `slot`.
/// The legacy `slot-scope` attribute is reported as a directive of that name.
pub fn parse_directive_name(raw: &str) -> Option<DirectiveName<'_>> {
    if raw == "slot-scope" {
        return Some(DirectiveName {
            name: "slot-scope",
            arg: None,
            modifiers: Vec::new(),
        });
    }
    let (name, mut cursor) = if let Some(rest) = raw.strip_prefix("v-") {
        let len = rest.find([':', '.']).unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        let cursor = 2 + len;
        // `v-name:arg`; a `.` right after the name starts the modifiers
        let cursor = if raw.as_bytes().get(cursor) == Some(&b':') {
            cursor + 1
        } else {
            cursor
        };
        (&rest[..len], cursor)
    } else {
        let name = match raw.as_bytes().first() {
            Some(b':' | b'.') => "bind",
            Some(b'@') => "on",
            Some(b'#') => "slot",
            _ => return None,
        };
        if raw.len() == 1 {
            return None;
        }
        (name, 1)
    };

    let takes_arg = cursor == 1 || raw.as_bytes().get(cursor - 1) == Some(&b':');
    let mut arg = None;
    if takes_arg && cursor < raw.len() {
        let rest = &raw[cursor..];
        let dynamic_end = rest
            .strip_prefix('[')
            .and_then(|inner| inner.find(']'))
            .map(|close| cursor + 1 + close);
        let (start, end, next, dynamic) = match dynamic_end {
            Some(close) => (cursor + 1, close, close + 1, true),
            // slot names may contain dots
            None if name == "slot" => (cursor, raw.len(), raw.len(), false),
            None => {
                let end = rest.find('.').map_or(raw.len(), |dot| cursor + dot);
                (cursor, end, end, false)
            }
        };
        if dynamic || start < end {
            arg = Some(DirectiveNameArg {
                text: &raw[start..end],
                start,
                end,
                dynamic,
            });
        }
        cursor = next;
    }

    let mut modifiers: Vec<&str> = raw[cursor.min(raw.len())..]
        .split('.')
        .filter(|modifier| !modifier.is_empty())
        .collect();
    if raw.starts_with('.') {
        modifiers.push("prop");
    }

    Some(DirectiveName {
        name,
        arg,
        modifiers,
    })
}

/// Start tag being assembled
struct OpenTag {
    start: usize,
    tag: String,
    props: Vec<PropNode>,
}

/// Attribute name seen, value not yet
struct PendingAttribute {
    start: usize,
    end: usize,
    assign: Option<usize>,
}

struct PendingEndTag {
    start: usize,
    tag: String,
}

/// `<!--` or `{{` seen, closer not yet
struct PendingBlock {
    start: usize,
    content: Option<SourceRange>,
}

struct Parser<'a> {
    source: &'a str,
    /// Elements whose end tag has not been seen
    stack: Vec<ElementNode>,
    children: Vec<TemplateChildNode>,
    open_tag: Option<OpenTag>,
    attribute: Option<PendingAttribute>,
    end_tag: Option<PendingEndTag>,
    comment: Option<PendingBlock>,
    interpolation: Option<PendingBlock>,
    errors: Vec<TemplateParseError>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            stack: Vec::new(),
            children: Vec::new(),
            open_tag: None,
            attribute: None,
            end_tag: None,
            comment: None,
            interpolation: None,
            errors: Vec::new(),
        }
    }

    fn on_token(&mut self, token: Token<'a>) {
        if let Some(message) = token.error {
            self.errors.push(TemplateParseError::UnexpectedCharacterInTag {
                message: message.into(),
                offset: token.offset as u32,
            });
        }

        match token.kind {
            TokenType::Content | TokenType::Script | TokenType::Styles => {
                self.on_text(token.offset, token.end())
            }
            TokenType::StartInterpolation => {
                self.interpolation = Some(PendingBlock {
                    start: token.offset,
                    content: None,
                })
            }
            TokenType::InterpolationContent => {
                if let Some(pending) = self.interpolation.as_mut() {
                    pending.content = Some(SourceRange::from_usize(token.offset, token.end()));
                }
            }
            TokenType::EndInterpolation => self.on_interpolation_end(token.end()),
            TokenType::StartCommentTag => {
                self.comment = Some(PendingBlock {
                    start: token.offset,
                    content: None,
                })
            }
            TokenType::Comment => {
                if let Some(pending) = self.comment.as_mut() {
                    pending.content = Some(SourceRange::from_usize(token.offset, token.end()));
                }
            }
            TokenType::EndCommentTag => self.on_comment_end(token.end()),
            TokenType::StartTagOpen => {
                self.open_tag = Some(OpenTag {
                    start: token.offset,
                    tag: String::default(),
                    props: Vec::new(),
                })
            }
            TokenType::StartTag => {
                if let Some(open) = self.open_tag.as_mut() {
                    open.tag = token.text.to_ascii_lowercase().into();
                }
            }
            TokenType::AttributeName => {
                self.finish_attribute(None);
                self.attribute = Some(PendingAttribute {
                    start: token.offset,
                    end: token.end(),
                    assign: None,
                });
            }
            TokenType::DelimiterAssign => {
                if let Some(attr) = self.attribute.as_mut() {
                    attr.assign = Some(token.offset);
                }
            }
            TokenType::AttributeValue => self.finish_attribute(Some(token)),
            TokenType::StartTagClose => self.on_open_tag_end(token.end(), false),
            TokenType::StartTagSelfClose => self.on_open_tag_end(token.end(), true),
            TokenType::EndTagOpen => {
                self.end_tag = Some(PendingEndTag {
                    start: token.offset,
                    tag: String::default(),
                })
            }
            TokenType::EndTag => {
                if let Some(end_tag) = self.end_tag.as_mut() {
                    end_tag.tag = token.text.to_ascii_lowercase().into();
                }
            }
            TokenType::EndTagClose => self.on_close_tag(token.end()),
            TokenType::Whitespace
            | TokenType::Unknown
            | TokenType::StartDoctypeTag
            | TokenType::Doctype
            | TokenType::EndDoctypeTag
            | TokenType::Eos => {}
        }
    }

    /// Add a node to the innermost open element, or to the root
    fn add_child(&mut self, child: TemplateChildNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(child),
            None => self.children.push(child),
        }
    }

    fn on_text(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let siblings = match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.children,
        };
        // Adjacent content tokens form one text node
        if let Some(TemplateChildNode::Text(last)) = siblings.last_mut() {
            if last.loc.end as usize == start {
                last.content.push_str(&self.source[start..end]);
                last.loc.end = end as u32;
                return;
            }
        }
        siblings.push(TemplateChildNode::Text(TextNode::new(
            &self.source[start..end],
            SourceRange::from_usize(start, end),
        )));
    }

    fn on_interpolation_end(&mut self, end: usize) {
        let Some(pending) = self.interpolation.take() else {
            return;
        };
        let node = self.interpolation_node(pending, end);
        self.add_child(node);
    }

    fn interpolation_node(&self, pending: PendingBlock, end: usize) -> TemplateChildNode {
        let inner_start = (pending.start + 2).min(end);
        let content_loc = pending
            .content
            .unwrap_or_else(|| SourceRange::from_usize(inner_start, inner_start));
        TemplateChildNode::Interpolation(InterpolationNode {
            content: SimpleExpressionNode::new(
                content_loc.slice(self.source).unwrap_or_default(),
                content_loc,
            ),
            loc: SourceRange::from_usize(pending.start, end),
        })
    }

    fn on_comment_end(&mut self, end: usize) {
        let Some(pending) = self.comment.take() else {
            return;
        };
        let node = self.comment_node(pending, end);
        self.add_child(node);
    }

    fn comment_node(&self, pending: PendingBlock, end: usize) -> TemplateChildNode {
        let content = pending
            .content
            .and_then(|loc| loc.slice(self.source))
            .unwrap_or_default();
        TemplateChildNode::Comment(CommentNode::new(
            content,
            SourceRange::from_usize(pending.start, end),
        ))
    }

    /// Turn the pending attribute into a prop on the open tag
    fn finish_attribute(&mut self, value: Option<Token<'a>>) {
        let Some(attr) = self.attribute.take() else {
            return;
        };
        if value.is_none() {
            if let Some(assign) = attr.assign {
                self.errors.push(TemplateParseError::MissingAttributeValue {
                    offset: assign as u32,
                });
            }
        }

        let end = value.map_or(attr.end, |token| token.end());
        let value = value.map(unquote);
        let prop = build_prop(self.source, attr.start, attr.end, value, end);
        if let Some(open) = self.open_tag.as_mut() {
            open.props.push(prop);
        }
    }

    fn on_open_tag_end(&mut self, end: usize, self_closing: bool) {
        self.finish_attribute(None);
        let Some(open) = self.open_tag.take() else {
            return;
        };
        // A `<` with no tag name after it is just text
        if open.tag.is_empty() {
            self.on_text(open.start, end);
            return;
        }

        let loc = SourceRange::from_usize(open.start, end);
        let mut element = ElementNode::new(open.tag, loc);
        element.props = open.props;
        element.is_self_closing = self_closing;

        if self_closing || is_void_tag(&element.tag) {
            self.add_child(TemplateChildNode::Element(Box::new(element)));
        } else {
            self.stack.push(element);
        }
    }

    fn on_close_tag(&mut self, end: usize) {
        let Some(end_tag) = self.end_tag.take() else {
            return;
        };

        let Some(index) = self.stack.iter().rposition(|el| el.tag == end_tag.tag) else {
            if !is_void_tag(&end_tag.tag) {
                self.errors.push(TemplateParseError::InvalidEndTag {
                    tag: end_tag.tag.to_string(),
                    offset: end_tag.start as u32,
                });
            }
            return;
        };

        // Everything opened after the match is implicitly closed here
        while self.stack.len() > index + 1 {
            if let Some(mut unclosed) = self.stack.pop() {
                self.errors.push(TemplateParseError::MissingEndTag {
                    tag: unclosed.tag.to_string(),
                    offset: unclosed.loc.start,
                });
                unclosed.loc.end = end_tag.start as u32;
                self.add_child(TemplateChildNode::Element(Box::new(unclosed)));
            }
        }
        if let Some(mut element) = self.stack.pop() {
            element.loc.end = end as u32;
            self.add_child(TemplateChildNode::Element(Box::new(element)));
        }
    }

    fn finish(mut self) -> ParseResult {
        let len = self.source.len();

        if let Some(pending) = self.comment.take() {
            self.errors.push(TemplateParseError::EofInComment {
                offset: pending.start as u32,
            });
            let node = self.comment_node(pending, len);
            self.add_child(node);
        }
        if let Some(pending) = self.interpolation.take() {
            self.errors.push(TemplateParseError::EofInInterpolation {
                offset: pending.start as u32,
            });
            let node = self.interpolation_node(pending, len);
            self.add_child(node);
        }
        if self.open_tag.is_some() {
            let start = self.open_tag.as_ref().map_or(len, |open| open.start);
            self.errors.push(TemplateParseError::EofInTag {
                offset: start as u32,
            });
            // Keep what was read of the tag
            self.on_open_tag_end(len, false);
        }
        if let Some(end_tag) = self.end_tag.take() {
            self.errors.push(TemplateParseError::EofInTag {
                offset: end_tag.start as u32,
            });
        }

        while let Some(mut unclosed) = self.stack.pop() {
            self.errors.push(TemplateParseError::MissingEndTag {
                tag: unclosed.tag.to_string(),
                offset: unclosed.loc.start,
            });
            unclosed.loc.end = len as u32;
            self.add_child(TemplateChildNode::Element(Box::new(unclosed)));
        }

        ParseResult {
            root: RootNode {
                children: self.children,
                loc: SourceRange::from_usize(0, len),
            },
            errors: self.errors,
        }
    }
}

/// Span of an attribute value token without its quotes
fn unquote(token: Token<'_>) -> (usize, usize) {
    let bytes = token.text.as_bytes();
    match bytes.first() {
        Some(&quote @ (b'"' | b'\'')) => {
            let closed = bytes.len() >= 2 && bytes[bytes.len() - 1] == quote;
            let end = if closed { token.end() - 1 } else { token.end() };
            (token.offset + 1, end)
        }
        _ => (token.offset, token.end()),
    }
}

fn build_prop(
    source: &str,
    name_start: usize,
    name_end: usize,
    value: Option<(usize, usize)>,
    end: usize,
) -> PropNode {
    let raw = &source[name_start..name_end];
    let loc = SourceRange::from_usize(name_start, end);
    let value_node = |(start, end): (usize, usize)| {
        (&source[start..end], SourceRange::from_usize(start, end))
    };

    let Some(parsed) = parse_directive_name(raw) else {
        let mut attr = AttributeNode::new(raw, loc);
        attr.name_loc = SourceRange::from_usize(name_start, name_end);
        attr.value = value
            .map(value_node)
            .map(|(content, loc)| TextNode::new(content, loc));
        return PropNode::Attribute(attr);
    };

    let mut dir = DirectiveNode::new(parsed.name, raw, loc);
    dir.arg = parsed.arg.map(|arg| {
        let exp = SimpleExpressionNode::new(
            arg.text,
            SourceRange::from_usize(name_start + arg.start, name_start + arg.end),
        );
        if arg.dynamic {
            DirectiveArg::Dynamic(exp)
        } else {
            DirectiveArg::Static(exp)
        }
    });
    dir.modifiers = parsed.modifiers.into_iter().map(String::from).collect();
    dir.exp = value
        .map(value_node)
        .map(|(content, loc)| SimpleExpressionNode::new(content, loc));
    PropNode::Directive(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfumato_relief::ErrorCode;

    fn first_element(result: &ParseResult) -> &ElementNode {
        result.root.children[0]
            .as_element()
            .expect("expected an element")
    }

    #[test]
    fn test_parse_simple_element() {
        let result = parse("<div></div>");

        assert!(result.errors.is_empty());
        assert_eq!(result.root.children.len(), 1);

        if let TemplateChildNode::Element(el) = &result.root.children[0] {
            assert_eq!(el.tag.as_str(), "div");
            assert!(!el.is_self_closing);
            assert_eq!(el.loc, SourceRange::new(0, 11));
            assert_eq!(el.start_tag_loc, SourceRange::new(0, 5));
        } else {
            panic!("Expected element node");
        }
    }

    #[test]
    fn test_parse_text() {
        let result = parse("hello");

        assert!(result.errors.is_empty());
        if let TemplateChildNode::Text(text) = &result.root.children[0] {
            assert_eq!(text.content.as_str(), "hello");
            assert_eq!(text.loc, SourceRange::new(0, 5));
        } else {
            panic!("Expected text node");
        }
    }

    #[test]
    fn test_parse_interpolation() {
        let result = parse("<p>{{ msg }}</p>");

        assert!(result.errors.is_empty());
        let p = first_element(&result);
        if let TemplateChildNode::Interpolation(interp) = &p.children[0] {
            assert_eq!(interp.content.content.as_str(), " msg ");
            assert_eq!(interp.content.loc, SourceRange::new(5, 10));
            assert_eq!(interp.loc, SourceRange::new(3, 12));
        } else {
            panic!("Expected interpolation node");
        }
    }

    #[test]
    fn test_parse_empty_interpolation() {
        let result = parse("{{}}");

        if let TemplateChildNode::Interpolation(interp) = &result.root.children[0] {
            assert!(interp.content.is_blank());
            assert_eq!(interp.content.loc, SourceRange::new(2, 2));
        } else {
            panic!("Expected interpolation node");
        }
    }

    #[test]
    fn test_parse_directive() {
        let result = parse(r#"<div v-if="ok"></div>"#);

        assert!(result.errors.is_empty());
        let el = first_element(&result);
        assert_eq!(el.props.len(), 1);
        if let PropNode::Directive(dir) = &el.props[0] {
            assert_eq!(dir.name.as_str(), "if");
            assert_eq!(dir.raw_name.as_str(), "v-if");
            let exp = dir.exp.as_ref().expect("expected a value");
            assert_eq!(exp.content.as_str(), "ok");
            assert_eq!(exp.loc, SourceRange::new(11, 13));
            assert_eq!(dir.loc, SourceRange::new(5, 14));
        } else {
            panic!("Expected directive");
        }
    }

    #[test]
    fn test_parse_shorthand_bind() {
        let result = parse(r#"<div :title="msg"></div>"#);

        let el = first_element(&result);
        if let PropNode::Directive(dir) = &el.props[0] {
            assert_eq!(dir.name.as_str(), "bind");
            if let Some(DirectiveArg::Static(arg)) = &dir.arg {
                assert_eq!(arg.content.as_str(), "title");
                assert_eq!(arg.loc, SourceRange::new(6, 11));
            } else {
                panic!("Expected static argument");
            }
        } else {
            panic!("Expected directive");
        }
    }

    #[test]
    fn test_parse_dynamic_argument() {
        let result = parse(r#"<div v-bind:[key]="value"></div>"#);

        let el = first_element(&result);
        let dir = el.props[0].as_directive().expect("expected directive");
        if let Some(DirectiveArg::Dynamic(arg)) = &dir.arg {
            assert_eq!(arg.content.as_str(), "key");
            assert_eq!(arg.loc, SourceRange::new(13, 16));
        } else {
            panic!("Expected dynamic argument");
        }
    }

    #[test]
    fn test_parse_event_modifiers() {
        let result = parse(r#"<button @click.stop.prevent="go"></button>"#);

        let dir = first_element(&result).props[0]
            .as_directive()
            .expect("expected directive");
        assert_eq!(dir.name.as_str(), "on");
        assert_eq!(dir.arg.as_ref().map(|a| a.expression().content.as_str()), Some("click"));
        assert_eq!(dir.modifiers, vec![String::from("stop"), String::from("prevent")]);
    }

    #[test]
    fn test_parse_attribute_values() {
        let result = parse(r#"<input id=name disabled title='a b'>"#);

        assert!(result.errors.is_empty());
        let el = first_element(&result);
        assert_eq!(el.props.len(), 3);

        let values: Vec<_> = el
            .props
            .iter()
            .map(|prop| match prop {
                PropNode::Attribute(attr) => attr.value.as_ref().map(|v| v.content.to_string()),
                PropNode::Directive(_) => panic!("Expected attribute"),
            })
            .collect();
        assert_eq!(
            values,
            vec![Some("name".to_string()), None, Some("a b".to_string())]
        );
    }

    #[test]
    fn test_parse_empty_quoted_value() {
        let result = parse(r#"<div :title="" />"#);

        let dir = first_element(&result).props[0]
            .as_directive()
            .expect("expected directive");
        let exp = dir.exp.as_ref().expect("expected an empty value");
        assert_eq!(exp.content.as_str(), "");
        assert_eq!(exp.loc, SourceRange::new(13, 13));
        assert!(dir.value().is_none());
    }

    #[test]
    fn test_parse_self_closing_and_void() {
        let result = parse("<div><my-comp /><br><span>x</span></div>");

        assert!(result.errors.is_empty());
        let div = first_element(&result);
        let tags: Vec<_> = div
            .children
            .iter()
            .filter_map(TemplateChildNode::as_element)
            .map(|el| el.tag.as_str())
            .collect();
        assert_eq!(tags, vec!["my-comp", "br", "span"]);
        assert!(div.children[0].as_element().is_some_and(|el| el.is_self_closing));
    }

    #[test]
    fn test_parse_tag_names_lowercased() {
        let result = parse("<MyComp></mycomp>");

        assert!(result.errors.is_empty());
        assert_eq!(first_element(&result).tag.as_str(), "mycomp");
    }

    #[test]
    fn test_parse_comment() {
        let result = parse("<!-- note --><div></div>");

        assert_eq!(result.root.children.len(), 2);
        if let TemplateChildNode::Comment(comment) = &result.root.children[0] {
            assert_eq!(comment.content.as_str(), " note ");
            assert_eq!(comment.loc, SourceRange::new(0, 13));
        } else {
            panic!("Expected comment node");
        }
    }

    #[test]
    fn test_parse_missing_end_tag() {
        let result = parse("<div><span></div>");

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), ErrorCode::MissingEndTag);
        let div = first_element(&result);
        assert_eq!(div.loc, SourceRange::new(0, 17));
        let span = div.children[0].as_element().expect("expected span");
        assert_eq!(span.loc, SourceRange::new(5, 11));
    }

    #[test]
    fn test_parse_invalid_end_tag() {
        let result = parse("<div></span></div>");

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), ErrorCode::InvalidEndTag);
        assert_eq!(result.errors[0].offset(), 5);
        assert_eq!(result.root.children.len(), 1);
    }

    #[test]
    fn test_parse_unclosed_at_eof() {
        let result = parse("<div><p>{{ a");

        let codes: Vec<_> = result.errors.iter().map(|e| e.code()).collect();
        assert_eq!(
            codes,
            vec![
                ErrorCode::EofInInterpolation,
                ErrorCode::MissingEndTag,
                ErrorCode::MissingEndTag
            ]
        );
        let div = first_element(&result);
        let p = div.children[0].as_element().expect("expected p");
        assert!(matches!(p.children[0], TemplateChildNode::Interpolation(_)));
    }

    #[test]
    fn test_parse_missing_attribute_value() {
        let result = parse("<div a=></div>");

        assert_eq!(result.errors[0].code(), ErrorCode::MissingAttributeValue);
        assert_eq!(result.errors[0].offset(), 6);
    }

    #[test]
    fn test_parse_stray_less_than_recovers() {
        let result = parse("a < b");

        assert_eq!(result.errors[0].code(), ErrorCode::UnexpectedCharacterInTag);
        if let TemplateChildNode::Text(text) = &result.root.children[0] {
            assert_eq!(text.content.as_str(), "a ");
        } else {
            panic!("Expected text node");
        }
    }

    #[test]
    fn test_parse_directive_name() {
        let parsed = parse_directive_name("v-on:click.stop").expect("directive");
        assert_eq!(parsed.name, "on");
        assert_eq!(parsed.arg.as_ref().map(|a| a.text), Some("click"));
        assert_eq!(parsed.modifiers, vec!["stop"]);

        let parsed = parse_directive_name("v-model.trim").expect("directive");
        assert_eq!(parsed.name, "model");
        assert!(parsed.arg.is_none());
        assert_eq!(parsed.modifiers, vec!["trim"]);

        let parsed = parse_directive_name(".value").expect("directive");
        assert_eq!(parsed.name, "bind");
        assert_eq!(parsed.arg.as_ref().map(|a| a.text), Some("value"));
        assert_eq!(parsed.modifiers, vec!["prop"]);

        let parsed = parse_directive_name("#item.header").expect("directive");
        assert_eq!(parsed.name, "slot");
        assert_eq!(parsed.arg.as_ref().map(|a| a.text), Some("item.header"));

        let parsed = parse_directive_name("@[event.name].once").expect("directive");
        let arg = parsed.arg.expect("argument");
        assert!(arg.dynamic);
        assert_eq!(arg.text, "event.name");
        assert_eq!((arg.start, arg.end), (2, 12));
        assert_eq!(parsed.modifiers, vec!["once"]);

        let parsed = parse_directive_name(":[]").expect("directive");
        assert_eq!(parsed.arg.map(|a| (a.text, a.dynamic)), Some(("", true)));

        let parsed = parse_directive_name("slot-scope").expect("directive");
        assert_eq!(parsed.name, "slot-scope");
        assert!(parsed.arg.is_none());

        assert!(parse_directive_name("class").is_none());
        assert!(parse_directive_name("slot").is_none());
        assert!(parse_directive_name("v-").is_none());
        assert!(parse_directive_name(":").is_none());
    }
}
