//! Region extraction.
//!
//! One pass over the scanner's tokens splits an SFC document into tagged,
//! non-overlapping byte ranges: the template body, script bodies, style
//! bodies and custom blocks.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sfumato_armature::{Scanner, TokenType};
use sfumato_carton::{CompactString, SourceRange};

/// Terminator of a template written in a non-HTML language
static TEMPLATE_END_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</template>").expect("valid template end regex"));

/// Block kind of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Template,
    Script,
    Style,
    Custom,
}

impl BlockKind {
    pub const ALL: [BlockKind; 4] = [Self::Template, Self::Script, Self::Style, Self::Custom];

    /// Language of a block with no usable `lang` attribute
    pub fn default_language(self) -> &'static str {
        match self {
            Self::Template => "vue-html",
            Self::Script => "javascript",
            Self::Style => "css",
            Self::Custom => "unknown",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Script => "script",
            Self::Style => "style",
            Self::Custom => "custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tagged byte range of an SFC document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub language_id: CompactString,
    pub kind: BlockKind,
    pub start: u32,
    pub end: u32,
}

impl Region {
    pub fn new(language_id: impl Into<CompactString>, kind: BlockKind, start: usize, end: usize) -> Self {
        Self {
            language_id: language_id.into(),
            kind,
            start: start as u32,
            end: end as u32,
        }
    }

    pub fn range(&self) -> SourceRange {
        SourceRange::new(self.start, self.end)
    }

    /// Text of the region in `source`
    pub fn content<'a>(&self, source: &'a str) -> &'a str {
        self.range().slice(source).unwrap_or_default()
    }
}

/// Output of [`extract_regions`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SfcRegions {
    /// Ordered by `start`, never overlapping
    pub regions: Vec<Region>,
    /// `src` values of `<script>` tags, quotes removed
    pub imported_scripts: Vec<CompactString>,
}

impl SfcRegions {
    /// First region of `kind`
    pub fn first_of(&self, kind: BlockKind) -> Option<&Region> {
        self.regions.iter().find(|region| region.kind == kind)
    }
}

/// Resolve a `lang` attribute value to a language id.
pub fn language_from_lang_attr(value: &str) -> CompactString {
    let lang: CompactString = value.chars().filter(|c| !matches!(c, '"' | '\'')).collect();
    match lang.as_str() {
        "jade" => "pug".into(),
        "ts" => "typescript".into(),
        _ => lang,
    }
}

/// Style languages honored from `lang`; anything else is treated as css
fn is_style_language(lang: &str) -> bool {
    matches!(lang, "sass" | "scss" | "less" | "postcss" | "stylus")
}

/// Split an SFC document into regions.
///
/// Only top-level `<template>` and custom blocks go through the nested
/// region scanners; script and style bodies come straight from the
/// scanner's verbatim tokens.
pub fn extract_regions(text: &str) -> SfcRegions {
    let mut scanner = Scanner::new(text);
    let mut result = SfcRegions::default();
    let mut last_tag_name = "";
    let mut last_attribute_name = "";
    let mut lang: Option<CompactString> = None;
    let mut stakes = 0i32;

    loop {
        match scanner.scan() {
            TokenType::Eos => break,
            TokenType::Styles => {
                let language = lang
                    .take()
                    .filter(|lang| is_style_language(lang))
                    .unwrap_or_else(|| BlockKind::Style.default_language().into());
                result.regions.push(Region::new(
                    language,
                    BlockKind::Style,
                    scanner.token_offset(),
                    scanner.token_end(),
                ));
            }
            TokenType::Script => {
                let language = lang
                    .take()
                    .filter(|lang| !lang.is_empty())
                    .unwrap_or_else(|| BlockKind::Script.default_language().into());
                result.regions.push(Region::new(
                    language,
                    BlockKind::Script,
                    scanner.token_offset(),
                    scanner.token_end(),
                ));
            }
            TokenType::StartTag => {
                stakes += 1;
                let tag_name = scanner.token_text();
                if stakes == 1 {
                    let region = match tag_name {
                        "template" => scan_template_region(&mut scanner, text),
                        "style" | "script" => None,
                        _ => scan_custom_region(tag_name, &mut scanner, text),
                    };
                    result.regions.extend(region);
                }
                last_tag_name = tag_name;
                last_attribute_name = "";
            }
            TokenType::AttributeName => last_attribute_name = scanner.token_text(),
            TokenType::AttributeValue => {
                if last_attribute_name == "lang" {
                    lang = Some(language_from_lang_attr(scanner.token_text()));
                } else if last_attribute_name == "src" && last_tag_name.eq_ignore_ascii_case("script") {
                    result
                        .imported_scripts
                        .push(strip_quotes(scanner.token_text()).into());
                }
                last_attribute_name = "";
            }
            TokenType::StartTagSelfClose | TokenType::EndTagClose => {
                stakes -= 1;
                last_attribute_name = "";
                lang = None;
            }
            _ => {}
        }
    }

    tracing::debug!(regions = result.regions.len(), "extracted sfc regions");
    result
}

/// Remove one pair of surrounding quotes
fn strip_quotes(value: &str) -> &str {
    match value.as_bytes().first() {
        Some(b'"' | b'\'') if value.len() >= 2 => &value[1..value.len() - 1],
        _ => value,
    }
}

fn scan_template_region(scanner: &mut Scanner<'_>, text: &str) -> Option<Region> {
    let mut language: CompactString = BlockKind::Template.default_language().into();
    let mut token = TokenType::Unknown;
    let mut start = 0;
    let mut unclosed = 1;
    let mut last_attribute_name: Option<&str> = None;

    while unclosed != 0 {
        // Non-HTML bodies are not tokenized; only the terminator matters
        if token == TokenType::AttributeValue && language != "vue-html" {
            while !matches!(token, TokenType::StartTagClose | TokenType::StartTagSelfClose) {
                token = scanner.scan();
                if token == TokenType::Eos {
                    return dropped(BlockKind::Template, start);
                }
            }
            start = scanner.token_end();

            if scanner.scan_for_pattern(&TEMPLATE_END_PATTERN) == TokenType::Eos {
                return dropped(BlockKind::Template, start);
            }
            // past `</` to `template`
            while token != TokenType::EndTag {
                token = scanner.scan();
                if token == TokenType::Eos {
                    return dropped(BlockKind::Template, start);
                }
            }
            break;
        }

        token = scanner.scan();
        if token == TokenType::Eos {
            return dropped(BlockKind::Template, start);
        }

        if start == 0 {
            match token {
                TokenType::AttributeName => last_attribute_name = Some(scanner.token_text()),
                TokenType::AttributeValue => {
                    if last_attribute_name == Some("lang") {
                        language = language_from_lang_attr(scanner.token_text());
                    }
                    last_attribute_name = None;
                }
                TokenType::StartTagClose => start = scanner.token_end(),
                _ => {}
            }
            continue;
        }

        match closing_step(scanner, text, "template", &mut unclosed) {
            ClosingStep::Continue => {}
            ClosingStep::Break => break,
            ClosingStep::EndAt(end) => {
                return Some(Region::new(language, BlockKind::Template, start, end));
            }
        }
    }

    // The scanner sits on the `template` name of the end tag; back up over `</`
    let end = scanner.token_offset().saturating_sub(2);
    Some(Region::new(language, BlockKind::Template, start, end))
}

fn scan_custom_region(tag_name: &str, scanner: &mut Scanner<'_>, text: &str) -> Option<Region> {
    let mut language: CompactString = BlockKind::Custom.default_language().into();
    let mut start = 0;
    let mut unclosed = 1;
    let mut last_attribute_name: Option<&str> = None;

    while unclosed != 0 {
        let token = scanner.scan();
        if token == TokenType::Eos {
            return dropped(BlockKind::Custom, start);
        }

        if start == 0 {
            match token {
                TokenType::AttributeName => last_attribute_name = Some(scanner.token_text()),
                TokenType::AttributeValue => {
                    if last_attribute_name == Some("lang") {
                        language = language_from_lang_attr(scanner.token_text());
                    }
                    last_attribute_name = None;
                }
                TokenType::StartTagClose => start = scanner.token_end(),
                _ => {}
            }
            continue;
        }

        match closing_step(scanner, text, tag_name, &mut unclosed) {
            ClosingStep::Continue => {}
            ClosingStep::Break => break,
            ClosingStep::EndAt(end) => {
                return Some(Region::new(language, BlockKind::Custom, start, end));
            }
        }
    }

    let end = scanner.token_offset().saturating_sub(2);
    Some(Region::new(language, BlockKind::Custom, start, end))
}

enum ClosingStep {
    Continue,
    /// The current `EndTag` token closes the region
    Break,
    /// A closing tag the scanner could not tokenize ends the region here
    EndAt(usize),
}

/// Track nesting of `tag_name` inside a region body.
///
/// A closing tag only terminates the region early when a line break comes
/// right before it; one in the middle of a line is assumed to be content.
fn closing_step(scanner: &Scanner<'_>, text: &str, tag_name: &str, unclosed: &mut i32) -> ClosingStep {
    let bytes = text.as_bytes();
    match scanner.token_type() {
        TokenType::StartTag if scanner.token_text() == tag_name => *unclosed += 1,
        TokenType::EndTag if scanner.token_text() == tag_name => {
            *unclosed -= 1;
            let before = scanner.token_offset().checked_sub(3);
            if before.and_then(|pos| bytes.get(pos)) == Some(&b'\n') {
                return ClosingStep::Break;
            }
        }
        TokenType::Unknown if scanner.token_text().starts_with('<') => {
            let offset = scanner.token_offset();
            let closing_len = tag_name.len() + 3;
            let candidate = text.get(offset..offset + closing_len);
            let is_closing = candidate.is_some_and(|candidate| {
                candidate.starts_with("</")
                    && candidate.ends_with('>')
                    && &candidate[2..closing_len - 1] == tag_name
            });
            if is_closing {
                *unclosed -= 1;
                if offset > 0 && bytes.get(offset - 1) == Some(&b'\n') {
                    return ClosingStep::EndAt(offset);
                }
            }
        }
        _ => {}
    }
    ClosingStep::Continue
}

fn dropped(kind: BlockKind, start: usize) -> Option<Region> {
    tracing::debug!(%kind, start, "unterminated block dropped");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = "
<template>

</template>
<script>
export default {
}
</script>
<style>
</style>
";

    fn languages(result: &SfcRegions) -> Vec<&str> {
        result
            .regions
            .iter()
            .map(|region| region.language_id.as_str())
            .collect()
    }

    #[test]
    fn test_extract_basic() {
        let result = extract_regions(BASIC);

        assert_eq!(languages(&result), vec!["vue-html", "javascript", "css"]);
        let kinds: Vec<_> = result.regions.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![BlockKind::Template, BlockKind::Script, BlockKind::Style]);
        assert_eq!(result.regions[1].content(BASIC), "\nexport default {\n}\n");
    }

    #[test]
    fn test_extract_empty() {
        let result = extract_regions("");
        assert!(result.regions.is_empty());
        assert!(result.imported_scripts.is_empty());
    }

    #[test]
    fn test_extract_style_languages() {
        let src = r#"
<template>

</template>

<style lang="scss">
</style>

<style lang="stylus">
</style>

<style lang="sugarss">
</style>
"#;
        let result = extract_regions(src);
        assert_eq!(languages(&result), vec!["vue-html", "scss", "stylus", "css"]);
    }

    #[test]
    fn test_extract_script_lang_alias() {
        let result = extract_regions("<script lang=\"ts\">\nlet a = 1\n</script>\n");
        assert_eq!(languages(&result), vec!["typescript"]);

        let result = extract_regions("<script lang='tsx'>\n</script>\n");
        assert_eq!(languages(&result), vec!["tsx"]);
    }

    #[test]
    fn test_extract_imported_scripts() {
        let src = "
<template>

</template>

<script src=\"./external.js\">
</script>
";
        let result = extract_regions(src);
        assert_eq!(result.imported_scripts, vec![CompactString::from("./external.js")]);
    }

    #[test]
    fn test_extract_template_positions() {
        let src = "\n<template>\n  <p>Test</p>\n</template>\n";
        let result = extract_regions(src);

        assert_eq!(result.regions[0].language_id.as_str(), "vue-html");
        assert_eq!(result.regions[0].content(src), "\n  <p>Test</p>\n");
    }

    #[test]
    fn test_extract_single_line_template() {
        let src = "<template><div>Hello</div></template>";
        let result = extract_regions(src);
        assert_eq!(result.regions[0].content(src), "<div>Hello</div>");
    }

    #[test]
    fn test_extract_pug_template() {
        let src = "\n<template lang=\"pug\">\np Test\n</template>\n";
        let result = extract_regions(src);

        assert_eq!(result.regions[0].language_id.as_str(), "pug");
        assert_eq!(result.regions[0].content(src), "\np Test\n");
    }

    #[test]
    fn test_extract_empty_blocks() {
        let src = "<template lang=\"pug\"></template>\n<style></style>\n<script lang=\"ts\">\n</script>\n";
        let result = extract_regions(src);

        assert_eq!(languages(&result), vec!["pug", "typescript"]);
        assert_eq!(result.regions[0].range(), SourceRange::new(21, 21));
        assert_eq!(result.regions[1].kind, BlockKind::Script);
        assert_eq!(result.regions[1].content(src), "\n");
    }

    #[test]
    fn test_extract_jade_alias() {
        let src = "<template lang=\"jade\">\ndiv(a='</div>')\n</template>\n<style>\n</style>\n";
        let result = extract_regions(src);

        assert_eq!(languages(&result), vec!["pug", "css"]);
        assert_eq!(result.regions[0].content(src), "\ndiv(a='</div>')\n");
    }

    #[test]
    fn test_extract_nested_template() {
        let src = "
<template>
  <template>
    <p>Test</p>
  </template>
</template>
";
        let result = extract_regions(src);

        assert_eq!(result.regions.len(), 1);
        assert_eq!(
            result.regions[0].content(src),
            "\n  <template>\n    <p>Test</p>\n  </template>\n"
        );
    }

    #[test]
    fn test_extract_custom_block() {
        let src = "<template><div></div></template>\n<i18n lang=\"json\">\n{\"en\": {}}\n</i18n>\n<docs>\n# Hi\n</docs>\n";
        let result = extract_regions(src);

        assert_eq!(languages(&result), vec!["vue-html", "json", "unknown"]);
        assert_eq!(result.regions[1].kind, BlockKind::Custom);
        assert_eq!(result.regions[1].content(src), "\n{\"en\": {}}\n");
        assert_eq!(result.regions[2].content(src), "\n# Hi\n");
    }

    #[test]
    fn test_extract_unterminated_template_dropped() {
        let src = "<template>\n  <div></div>\n<script>\nlet a\n</script>";
        let result = extract_regions(src);
        assert!(result.first_of(BlockKind::Template).is_none());
    }

    #[test]
    fn test_extract_unterminated_pug_dropped() {
        let result = extract_regions("<template lang=\"pug\">\np hi\n");
        assert!(result.regions.is_empty());
    }

    #[test]
    fn test_language_from_lang_attr() {
        assert_eq!(language_from_lang_attr("\"ts\""), "typescript");
        assert_eq!(language_from_lang_attr("'jade'"), "pug");
        assert_eq!(language_from_lang_attr("scss"), "scss");
    }

    #[test]
    fn test_block_kind_names() {
        for kind in BlockKind::ALL {
            assert_eq!(BlockKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(BlockKind::from_name("page"), None);
        assert_eq!(
            serde_json::to_string(&BlockKind::Template).ok().as_deref(),
            Some("\"template\"")
        );
    }
}
