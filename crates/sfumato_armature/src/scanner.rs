//! Resumable HTML scanner for SFC documents and Vue templates.
//!
//! A pull lexer: every call to [`Scanner::scan`] produces exactly one token.
//! The scanner switches between markup, verbatim script body, verbatim style
//! body and interpolation modes as it goes. Its whole state fits in a
//! [`ScannerSnapshot`], so scanning can stop and resume anywhere.
//!
//! The scanner never fails. Input it cannot make sense of comes back as
//! [`TokenType::Unknown`], and every non-EOS token consumes at least one
//! character, so a scan loop over any text terminates.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Character codes for fast comparison
pub mod char_codes {
    pub const TAB: u8 = 0x09;
    pub const NEWLINE: u8 = 0x0A;
    pub const FORM_FEED: u8 = 0x0C;
    pub const CARRIAGE_RETURN: u8 = 0x0D;
    pub const SPACE: u8 = 0x20;
    pub const EXCLAMATION_MARK: u8 = 0x21;
    pub const DOUBLE_QUOTE: u8 = 0x22;
    pub const SINGLE_QUOTE: u8 = 0x27;
    pub const DASH: u8 = 0x2D;
    pub const DOT: u8 = 0x2E;
    pub const SLASH: u8 = 0x2F;
    pub const COLON: u8 = 0x3A;
    pub const LT: u8 = 0x3C;
    pub const EQ: u8 = 0x3D;
    pub const GT: u8 = 0x3E;
    pub const UNDERSCORE: u8 = 0x5F;
    pub const LEFT_BRACE: u8 = 0x7B;
    pub const RIGHT_BRACE: u8 = 0x7D;
}

use char_codes::*;

/// Comment-aware terminator search inside a script body
static SCRIPT_BODY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<!--|-->|</?script\s*/?>?").expect("valid script body pattern"));

/// Start of the closing tag of a style body
static STYLE_END_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</style").expect("valid style end pattern"));

/// `type` attribute values that keep a `<script>` body in markup mode
const HTML_SCRIPT_TYPES: &[&str] = &["text/x-handlebars-template", "text/x-template"];

/// Token kinds produced by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum TokenType {
    StartCommentTag,
    Comment,
    EndCommentTag,
    StartTagOpen,
    StartTagClose,
    StartTagSelfClose,
    StartTag,
    StartInterpolation,
    EndTagOpen,
    EndTagClose,
    EndTag,
    EndInterpolation,
    DelimiterAssign,
    AttributeName,
    AttributeValue,
    StartDoctypeTag,
    Doctype,
    EndDoctypeTag,
    Content,
    InterpolationContent,
    Whitespace,
    Unknown,
    /// Verbatim body of a `<script>` element
    Script,
    /// Verbatim body of a `<style>` element
    Styles,
    Eos,
}

/// All the modes the scanner can be in between tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[repr(u8)]
pub enum ScannerState {
    #[default]
    WithinContent,
    WithinInterpolation,
    AfterOpeningStartTag,
    AfterOpeningEndTag,
    WithinDoctype,
    WithinTag,
    WithinEndTag,
    WithinComment,
    WithinScriptContent,
    WithinStyleContent,
    AfterAttributeName,
    BeforeAttributeValue,
}

/// What the scanner remembers about the tag it is inside
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TagContext {
    /// Lowercased name of the last start tag
    last_tag: String,
    /// Lowercased name of the last attribute in that tag
    last_attribute_name: Option<String>,
    /// Unquoted value of the last `type` attribute
    last_type_value: Option<String>,
    /// Whether whitespace was seen since the tag name or the last attribute
    has_space_after_tag: bool,
}

/// Everything needed to resume scanning at a later point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerSnapshot {
    pub offset: usize,
    pub state: ScannerState,
    tag: TagContext,
}

impl ScannerSnapshot {
    /// A snapshot at `offset` in `state`, outside of any tag.
    pub fn at(offset: usize, state: ScannerState) -> Self {
        Self {
            offset,
            state,
            tag: TagContext::default(),
        }
    }
}

/// A scanned token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    pub kind: TokenType,
    pub offset: usize,
    pub length: usize,
    pub text: &'a str,
    /// Human readable hint for malformed input
    pub error: Option<&'static str>,
    /// Scanner mode right after this token
    pub state_after: ScannerState,
}

impl Token<'_> {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Outcome of one state handler
enum Step {
    /// A token was recognized
    Emit(TokenType, Option<&'static str>),
    /// Mode changed without consuming input; scan again in the new mode
    Rescan,
    /// Nothing fits; skip a character and go back to content mode
    Recover(&'static str),
}

/// Resumable HTML scanner
pub struct Scanner<'a> {
    /// Input source
    source: &'a str,
    input: &'a [u8],
    /// Current index
    position: usize,
    /// Current state
    state: ScannerState,
    tag: TagContext,
    token_type: TokenType,
    token_offset: usize,
    token_error: Option<&'static str>,
}

/// Check if character is whitespace
#[inline]
pub fn is_whitespace(c: u8) -> bool {
    c == SPACE || c == NEWLINE || c == TAB || c == FORM_FEED || c == CARRIAGE_RETURN
}

/// Check if character can start an element name (`[_:\w]`)
#[inline]
fn is_element_name_start(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == UNDERSCORE || c == COLON
}

/// Check if character can continue an element name (`[_:\w\-.]`)
#[inline]
fn is_element_name_char(c: u8) -> bool {
    is_element_name_start(c) || c == DASH || c == DOT
}

#[inline]
fn is_attribute_name_char(c: char) -> bool {
    !(c.is_whitespace()
        || matches!(c, '"' | '\'' | '<' | '>' | '/' | '=')
        || ('\u{00}'..='\u{0F}').contains(&c)
        || ('\u{7F}'..='\u{9F}').contains(&c))
}

#[inline]
fn is_unquoted_value_char(c: char) -> bool {
    !(c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '=' | '<' | '>' | '/'))
}

impl<'a> Scanner<'a> {
    /// Create a scanner at the start of `source`, in content mode.
    pub fn new(source: &'a str) -> Self {
        Self::with_state(source, 0, ScannerState::WithinContent)
    }

    /// Create a scanner at an arbitrary offset and mode.
    pub fn with_state(source: &'a str, offset: usize, state: ScannerState) -> Self {
        Self::resume(source, ScannerSnapshot::at(offset, state))
    }

    /// Continue scanning `source` from a snapshot.
    pub fn resume(source: &'a str, snapshot: ScannerSnapshot) -> Self {
        Self {
            source,
            input: source.as_bytes(),
            position: snapshot.offset.min(source.len()),
            state: snapshot.state,
            tag: snapshot.tag,
            token_type: TokenType::Unknown,
            token_offset: snapshot.offset.min(source.len()),
            token_error: None,
        }
    }

    /// Capture the current position and mode.
    pub fn snapshot(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            offset: self.position,
            state: self.state,
            tag: self.tag.clone(),
        }
    }

    // ========== Token accessors ==========

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn token_offset(&self) -> usize {
        self.token_offset
    }

    pub fn token_length(&self) -> usize {
        self.position - self.token_offset
    }

    pub fn token_end(&self) -> usize {
        self.position
    }

    pub fn token_text(&self) -> &'a str {
        self.source
            .get(self.token_offset..self.position)
            .unwrap_or_default()
    }

    pub fn token_error(&self) -> Option<&'static str> {
        self.token_error
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    /// The last scanned token as a value
    pub fn token(&self) -> Token<'a> {
        Token {
            kind: self.token_type,
            offset: self.token_offset,
            length: self.token_length(),
            text: self.token_text(),
            error: self.token_error,
            state_after: self.state,
        }
    }

    /// Scan the next token and return it as a value
    pub fn next_token(&mut self) -> Token<'a> {
        self.scan();
        self.token()
    }

    // ========== Scanning ==========

    /// Scan the next token.
    ///
    /// Returns [`TokenType::Eos`] at the end of input, and keeps returning it
    /// on further calls.
    pub fn scan(&mut self) -> TokenType {
        let offset = self.position;
        let old_state = self.state;
        let token = self.internal_scan();
        if token != TokenType::Eos && offset == self.position {
            tracing::trace!(
                offset,
                ?old_state,
                state = ?self.state,
                "scanner has not advanced, forcing progress"
            );
            self.advance_char();
            return self.finish_token(offset, TokenType::Unknown, None);
        }
        token
    }

    /// Skip ahead to the next match of `pattern` without tokenizing.
    ///
    /// Used for bodies written in a non-HTML template language, where only the
    /// terminator matters. Leaves the scanner in content mode, positioned at
    /// the start of the match. Returns [`TokenType::Unknown`] for the skipped
    /// text, or [`TokenType::Eos`] if the pattern never matches. When the
    /// match starts right here there is nothing to skip, and the match's
    /// first token is scanned instead.
    pub fn scan_for_pattern(&mut self, pattern: &Regex) -> TokenType {
        let offset = self.position;
        self.state = ScannerState::WithinContent;
        if !self.advance_until_pattern(pattern) {
            return self.finish_token(offset, TokenType::Eos, None);
        }
        if self.position == offset {
            return self.scan();
        }
        self.finish_token(offset, TokenType::Unknown, None)
    }

    fn finish_token(
        &mut self,
        offset: usize,
        kind: TokenType,
        error: Option<&'static str>,
    ) -> TokenType {
        self.token_type = kind;
        self.token_offset = offset;
        self.token_error = error;
        kind
    }

    fn internal_scan(&mut self) -> TokenType {
        loop {
            let offset = self.position;
            if self.eos() {
                return self.finish_token(offset, TokenType::Eos, None);
            }

            let step = match self.state {
                ScannerState::WithinComment => self.state_within_comment(),
                ScannerState::WithinDoctype => self.state_within_doctype(),
                ScannerState::WithinContent => self.state_within_content(),
                ScannerState::WithinInterpolation => self.state_within_interpolation(),
                ScannerState::AfterOpeningEndTag => self.state_after_opening_end_tag(offset),
                ScannerState::WithinEndTag => self.state_within_end_tag(),
                ScannerState::AfterOpeningStartTag => self.state_after_opening_start_tag(offset),
                ScannerState::WithinTag => self.state_within_tag(),
                ScannerState::AfterAttributeName => self.state_after_attribute_name(),
                ScannerState::BeforeAttributeValue => self.state_before_attribute_value(offset),
                ScannerState::WithinScriptContent => self.state_within_script_content(offset),
                ScannerState::WithinStyleContent => self.state_within_style_content(offset),
            };

            match step {
                Step::Emit(kind, error) => return self.finish_token(offset, kind, error),
                Step::Rescan => continue,
                Step::Recover(message) => {
                    self.advance_char();
                    self.state = ScannerState::WithinContent;
                    return self.finish_token(offset, TokenType::Unknown, Some(message));
                }
            }
        }
    }

    // ========== State handlers ==========

    fn state_within_comment(&mut self) -> Step {
        if self.advance_if_chars(b"-->") {
            self.state = ScannerState::WithinContent;
            return Step::Emit(TokenType::EndCommentTag, None);
        }
        self.advance_until_chars(b"-->");
        Step::Emit(TokenType::Comment, None)
    }

    fn state_within_doctype(&mut self) -> Step {
        if self.advance_if_char(GT) {
            self.state = ScannerState::WithinContent;
            return Step::Emit(TokenType::EndDoctypeTag, None);
        }
        self.advance_until_char(GT);
        Step::Emit(TokenType::Doctype, None)
    }

    fn state_within_content(&mut self) -> Step {
        if self.advance_if_char(LT) {
            if !self.eos() && self.peek_char(0) == EXCLAMATION_MARK {
                if self.advance_if_chars(b"!--") {
                    self.state = ScannerState::WithinComment;
                    return Step::Emit(TokenType::StartCommentTag, None);
                }
                if self.advance_if_chars_ignore_case(b"!doctype") {
                    self.state = ScannerState::WithinDoctype;
                    return Step::Emit(TokenType::StartDoctypeTag, None);
                }
            }
            if self.advance_if_char(SLASH) {
                self.state = ScannerState::AfterOpeningEndTag;
                return Step::Emit(TokenType::EndTagOpen, None);
            }
            self.state = ScannerState::AfterOpeningStartTag;
            return Step::Emit(TokenType::StartTagOpen, None);
        }
        if self.advance_if_chars(b"{{") {
            self.state = ScannerState::WithinInterpolation;
            return Step::Emit(TokenType::StartInterpolation, None);
        }
        self.advance_until_content_break();
        Step::Emit(TokenType::Content, None)
    }

    fn state_within_interpolation(&mut self) -> Step {
        if self.advance_if_chars(b"}}") {
            self.state = ScannerState::WithinContent;
            return Step::Emit(TokenType::EndInterpolation, None);
        }
        self.advance_until_chars(b"}}");
        Step::Emit(TokenType::InterpolationContent, None)
    }

    fn state_after_opening_end_tag(&mut self, offset: usize) -> Step {
        if !self.next_element_name().is_empty() {
            self.state = ScannerState::WithinEndTag;
            return Step::Emit(TokenType::EndTag, None);
        }
        if self.skip_whitespace() {
            return Step::Emit(
                TokenType::Whitespace,
                Some("Tag name must directly follow the open bracket."),
            );
        }
        self.state = ScannerState::WithinEndTag;
        self.advance_until_char(GT);
        if offset < self.position {
            return Step::Emit(TokenType::Unknown, Some("End tag name expected."));
        }
        Step::Rescan
    }

    fn state_within_end_tag(&mut self) -> Step {
        if self.skip_whitespace() {
            return Step::Emit(TokenType::Whitespace, None);
        }
        if self.advance_if_char(GT) {
            self.state = ScannerState::WithinContent;
            return Step::Emit(TokenType::EndTagClose, None);
        }
        Step::Recover("Closing bracket expected.")
    }

    fn state_after_opening_start_tag(&mut self, offset: usize) -> Step {
        self.tag.last_tag = self.next_element_name();
        self.tag.last_type_value = None;
        self.tag.last_attribute_name = None;
        if !self.tag.last_tag.is_empty() {
            self.tag.has_space_after_tag = false;
            self.state = ScannerState::WithinTag;
            return Step::Emit(TokenType::StartTag, None);
        }
        if self.skip_whitespace() {
            return Step::Emit(
                TokenType::Whitespace,
                Some("Tag name must directly follow the open bracket."),
            );
        }
        self.state = ScannerState::WithinTag;
        self.advance_until_char(GT);
        if offset < self.position {
            return Step::Emit(TokenType::Unknown, Some("Start tag name expected."));
        }
        Step::Rescan
    }

    fn state_within_tag(&mut self) -> Step {
        if self.skip_whitespace() {
            self.tag.has_space_after_tag = true;
            return Step::Emit(TokenType::Whitespace, None);
        }
        if self.tag.has_space_after_tag {
            let name = self.next_attribute_name();
            let found = !name.is_empty();
            self.tag.last_attribute_name = Some(name);
            if found {
                self.state = ScannerState::AfterAttributeName;
                self.tag.has_space_after_tag = false;
                return Step::Emit(TokenType::AttributeName, None);
            }
        }
        if self.advance_if_chars(b"/>") {
            self.state = ScannerState::WithinContent;
            return Step::Emit(TokenType::StartTagSelfClose, None);
        }
        if self.advance_if_char(GT) {
            self.state = match self.tag.last_tag.as_str() {
                "script" => {
                    let stays_markup = self
                        .tag
                        .last_type_value
                        .as_deref()
                        .is_some_and(|ty| HTML_SCRIPT_TYPES.contains(&ty));
                    if stays_markup {
                        ScannerState::WithinContent
                    } else {
                        ScannerState::WithinScriptContent
                    }
                }
                "style" => ScannerState::WithinStyleContent,
                _ => ScannerState::WithinContent,
            };
            return Step::Emit(TokenType::StartTagClose, None);
        }
        self.advance_char();
        Step::Emit(TokenType::Unknown, Some("Unexpected character in tag."))
    }

    fn state_after_attribute_name(&mut self) -> Step {
        if self.skip_whitespace() {
            self.tag.has_space_after_tag = true;
            return Step::Emit(TokenType::Whitespace, None);
        }
        if self.advance_if_char(EQ) {
            self.state = ScannerState::BeforeAttributeValue;
            return Step::Emit(TokenType::DelimiterAssign, None);
        }
        self.state = ScannerState::WithinTag;
        Step::Rescan
    }

    fn state_before_attribute_value(&mut self, offset: usize) -> Step {
        if self.skip_whitespace() {
            return Step::Emit(TokenType::Whitespace, None);
        }

        let unquoted = self.advance_while(is_unquoted_value_char);
        if !unquoted.is_empty() {
            if self.last_attribute_is("type") {
                self.tag.last_type_value = Some(unquoted.to_string());
            }
            self.state = ScannerState::WithinTag;
            self.tag.has_space_after_tag = false;
            return Step::Emit(TokenType::AttributeValue, None);
        }

        let quote = self.peek_char(0);
        if quote == SINGLE_QUOTE || quote == DOUBLE_QUOTE {
            self.advance(1);
            if self.advance_until_char(quote) {
                self.advance(1);
            }
            if self.last_attribute_is("type") {
                let raw = self.source.get(offset + 1..self.position).unwrap_or_default();
                let value = raw.strip_suffix(quote as char).unwrap_or(raw);
                self.tag.last_type_value = Some(value.to_string());
            }
            self.state = ScannerState::WithinTag;
            self.tag.has_space_after_tag = false;
            return Step::Emit(TokenType::AttributeValue, None);
        }

        self.state = ScannerState::WithinTag;
        self.tag.has_space_after_tag = false;
        Step::Rescan
    }

    /// Script bodies end at the first `</script` that is not nested inside an
    /// HTML comment that itself opened a `<script`.
    ///
    /// Sub-states: 1 plain script, 2 inside `<!--`, 3 inside a `<script`
    /// found within that comment.
    fn state_within_script_content(&mut self, offset: usize) -> Step {
        let mut script_state = 1u8;
        while !self.eos() {
            let Some(found) = SCRIPT_BODY_PATTERN.find_at(self.source, self.position) else {
                self.position = self.input.len();
                return Step::Emit(TokenType::Script, None);
            };
            self.position = found.end();
            let matched = found.as_str().as_bytes();
            if matched == b"<!--" {
                if script_state == 1 {
                    script_state = 2;
                }
            } else if matched == b"-->" {
                script_state = 1;
            } else if matched.get(1) != Some(&SLASH) {
                if script_state == 2 {
                    script_state = 3;
                }
            } else if script_state == 3 {
                script_state = 2;
            } else {
                self.position = found.start();
                break;
            }
        }
        self.state = ScannerState::WithinContent;
        if offset < self.position {
            return Step::Emit(TokenType::Script, None);
        }
        Step::Rescan
    }

    fn state_within_style_content(&mut self, offset: usize) -> Step {
        self.advance_until_pattern(&STYLE_END_PATTERN);
        self.state = ScannerState::WithinContent;
        if offset < self.position {
            return Step::Emit(TokenType::Styles, None);
        }
        Step::Rescan
    }

    // ========== Stream helpers ==========

    #[inline]
    fn eos(&self) -> bool {
        self.position >= self.input.len()
    }

    #[inline]
    fn peek_char(&self, n: usize) -> u8 {
        self.input.get(self.position + n).copied().unwrap_or(0)
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        self.position = (self.position + n).min(self.input.len());
    }

    /// Advance past one whole character
    fn advance_char(&mut self) {
        let width = self
            .source
            .get(self.position..)
            .and_then(|rest| rest.chars().next())
            .map_or(1, char::len_utf8);
        self.advance(width);
    }

    #[inline]
    fn advance_if_char(&mut self, c: u8) -> bool {
        if self.peek_char(0) == c && !self.eos() {
            self.position += 1;
            return true;
        }
        false
    }

    fn advance_if_chars(&mut self, chars: &[u8]) -> bool {
        if self.input[self.position..].starts_with(chars) {
            self.position += chars.len();
            return true;
        }
        false
    }

    fn advance_if_chars_ignore_case(&mut self, chars: &[u8]) -> bool {
        let end = self.position + chars.len();
        if end <= self.input.len() && self.input[self.position..end].eq_ignore_ascii_case(chars) {
            self.position = end;
            return true;
        }
        false
    }

    /// Advance to the next `c`; to the end of input if there is none
    fn advance_until_char(&mut self, c: u8) -> bool {
        while self.position < self.input.len() {
            if self.input[self.position] == c {
                return true;
            }
            self.position += 1;
        }
        false
    }

    /// Advance to the next occurrence of `chars`; to the end if there is none
    fn advance_until_chars(&mut self, chars: &[u8]) -> bool {
        while self.position + chars.len() <= self.input.len() {
            if self.input[self.position..].starts_with(chars) {
                return true;
            }
            self.position += 1;
        }
        self.position = self.input.len();
        false
    }

    /// Advance to the next `<` or `{{`
    fn advance_until_content_break(&mut self) {
        while self.position < self.input.len() {
            let c = self.input[self.position];
            if c == LT || (c == LEFT_BRACE && self.peek_char(1) == LEFT_BRACE) {
                return;
            }
            self.position += 1;
        }
    }

    /// Advance to the start of the next match; to the end if there is none
    fn advance_until_pattern(&mut self, pattern: &Regex) -> bool {
        match pattern.find_at(self.source, self.position) {
            Some(found) => {
                self.position = found.start();
                true
            }
            None => {
                self.position = self.input.len();
                false
            }
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.position;
        while self.position < self.input.len() && is_whitespace(self.input[self.position]) {
            self.position += 1;
        }
        self.position > start
    }

    fn advance_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let start = self.position;
        let rest = self.source.get(start..).unwrap_or_default();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !accept(c))
            .map_or(rest.len(), |(i, _)| i);
        self.position = start + len;
        &rest[..len]
    }

    fn next_element_name(&mut self) -> String {
        let start = self.position;
        if !self.eos() && is_element_name_start(self.input[self.position]) {
            self.position += 1;
            while !self.eos() && is_element_name_char(self.input[self.position]) {
                self.position += 1;
            }
        }
        self.source[start..self.position].to_ascii_lowercase()
    }

    fn next_attribute_name(&mut self) -> String {
        self.advance_while(is_attribute_name_char).to_lowercase()
    }

    fn last_attribute_is(&self, name: &str) -> bool {
        self.tag.last_attribute_name.as_deref() == Some(name)
    }
}
