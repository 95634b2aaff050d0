//! Virtual documents and language lookups.
//!
//! A virtual document has the same byte length as the SFC it came from.
//! Bytes of the selected regions are copied verbatim and every other byte
//! becomes a space, except line breaks. Offsets, lines and columns in a
//! virtual document are therefore valid in the original as well.

use serde::Serialize;
use sfumato_carton::{CompactString, SourceRange};

use crate::regions::{extract_regions, BlockKind, Region, SfcRegions};

/// Language id of everything outside a region
pub const HOST_LANGUAGE: &str = "vue";

/// Which regions a virtual document keeps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Every region with this language id
    Language(CompactString),
    /// Every region of this block kind
    Kind(BlockKind),
}

impl Selector {
    fn matches(&self, region: &Region) -> bool {
        match self {
            Self::Language(id) => region.language_id == *id,
            Self::Kind(kind) => region.kind == *kind,
        }
    }
}

/// Identity of the document a virtual document is derived from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentMeta {
    pub uri: String,
    pub version: i32,
}

/// A whitespace-blanked view of an SFC document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualDocument {
    pub uri: String,
    pub language_id: CompactString,
    pub version: i32,
    pub text: String,
}

/// A span of the document and the language governing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageRange {
    pub start: u32,
    pub end: u32,
    pub language_id: CompactString,
    pub attribute_value: bool,
}

impl LanguageRange {
    fn new(start: usize, end: usize, language_id: impl Into<CompactString>) -> Self {
        Self {
            start: start as u32,
            end: end as u32,
            language_id: language_id.into(),
            attribute_value: false,
        }
    }

    pub fn range(&self) -> SourceRange {
        SourceRange::new(self.start, self.end)
    }
}

/// Replace every byte except `\n` and `\r` with a space.
pub fn blank(text: &str) -> String {
    blank_bytes(text.as_bytes()).collect()
}

fn blank_bytes(bytes: &[u8]) -> impl Iterator<Item = char> + '_ {
    bytes
        .iter()
        .map(|&b| if b == b'\n' || b == b'\r' { b as char } else { ' ' })
}

/// Copy `kept` regions of `text` verbatim and blank the rest.
fn blank_except<'r>(text: &str, kept: impl IntoIterator<Item = &'r Region>) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for region in kept {
        let range = region.range().as_usize();
        if range.start < cursor || range.start > range.end || range.end > bytes.len() {
            continue;
        }
        out.extend(blank_bytes(&bytes[cursor..range.start]));
        match text.get(range.clone()) {
            Some(content) => out.push_str(content),
            None => out.extend(blank_bytes(&bytes[range.clone()])),
        }
        cursor = range.end;
    }
    out.extend(blank_bytes(&bytes[cursor..]));
    out
}

/// Build the virtual document for `selector`.
///
/// The language id is the one of the first kept region. A kind selector
/// with nothing to keep falls back to the kind's default language, and a
/// language selector to the requested id.
pub fn virtual_document(
    meta: &DocumentMeta,
    text: &str,
    regions: &[Region],
    selector: &Selector,
) -> VirtualDocument {
    let kept: Vec<&Region> = regions.iter().filter(|r| selector.matches(r)).collect();
    let language_id = match (kept.first(), selector) {
        (Some(region), _) => region.language_id.clone(),
        (None, Selector::Language(id)) => id.clone(),
        (None, Selector::Kind(kind)) => kind.default_language().into(),
    };
    VirtualDocument {
        uri: meta.uri.clone(),
        language_id,
        version: meta.version,
        text: blank_except(text, kept),
    }
}

/// Virtual document keeping only the first region of `kind`.
pub fn single_kind_document(
    meta: &DocumentMeta,
    text: &str,
    regions: &[Region],
    kind: BlockKind,
) -> VirtualDocument {
    let first = regions.iter().find(|region| region.kind == kind);
    VirtualDocument {
        uri: meta.uri.clone(),
        language_id: first.map_or_else(
            || kind.default_language().into(),
            |region| region.language_id.clone(),
        ),
        version: meta.version,
        text: blank_except(text, first),
    }
}

/// Language id governing `offset`.
///
/// A region's `end` still belongs to it, so a cursor placed right after
/// the last character of a block resolves to the block's language.
pub fn language_at(regions: &[Region], offset: u32) -> CompactString {
    for region in regions {
        if region.start > offset {
            break;
        }
        if offset <= region.end {
            return region.language_id.clone();
        }
    }
    HOST_LANGUAGE.into()
}

/// Partition `range` (the whole document when `None`) by language.
///
/// Gaps between regions are reported as [`HOST_LANGUAGE`].
pub fn language_ranges(
    text: &str,
    regions: &[Region],
    range: Option<SourceRange>,
) -> Vec<LanguageRange> {
    let (mut current, end_offset) = match range {
        Some(range) => (range.start as usize, range.end as usize),
        None => (0, text.len()),
    };
    let mut result = Vec::new();

    for region in regions {
        let (region_start, region_end) = (region.start as usize, region.end as usize);
        if region_end <= current || region_start >= end_offset {
            continue;
        }
        let start = region_start.max(current);
        if current < region_start {
            result.push(LanguageRange::new(current, start, HOST_LANGUAGE));
        }
        let end = region_end.min(end_offset);
        if end > region_start {
            result.push(LanguageRange::new(start, end, region.language_id.clone()));
        }
        current = end;
    }
    if current < end_offset {
        result.push(LanguageRange::new(current, end_offset, HOST_LANGUAGE));
    }
    result
}

/// Distinct language ids of the document, host language first.
pub fn languages_in_document(regions: &[Region]) -> Vec<CompactString> {
    let mut result = vec![CompactString::from(HOST_LANGUAGE)];
    for region in regions {
        if !region.language_id.is_empty() && !result.contains(&region.language_id) {
            result.push(region.language_id.clone());
        }
    }
    result
}

/// The first region of `kind` as a language range.
pub fn language_range_of_kind(regions: &[Region], kind: BlockKind) -> Option<LanguageRange> {
    regions
        .iter()
        .find(|region| region.kind == kind)
        .map(|region| {
            LanguageRange::new(
                region.start as usize,
                region.end as usize,
                region.language_id.clone(),
            )
        })
}

/// An SFC document together with its extracted regions.
///
/// Built once per document version; every query reads from it.
#[derive(Debug, Clone)]
pub struct SfcDocument<'a> {
    meta: DocumentMeta,
    text: &'a str,
    regions: SfcRegions,
}

impl<'a> SfcDocument<'a> {
    pub fn new(uri: impl Into<String>, version: i32, text: &'a str) -> Self {
        Self {
            meta: DocumentMeta {
                uri: uri.into(),
                version,
            },
            text,
            regions: extract_regions(text),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions.regions
    }

    pub fn imported_scripts(&self) -> &[CompactString] {
        &self.regions.imported_scripts
    }

    pub fn virtual_document(&self, selector: &Selector) -> VirtualDocument {
        virtual_document(&self.meta, self.text, self.regions(), selector)
    }

    pub fn single_kind_document(&self, kind: BlockKind) -> VirtualDocument {
        single_kind_document(&self.meta, self.text, self.regions(), kind)
    }

    pub fn language_at(&self, offset: u32) -> CompactString {
        language_at(self.regions(), offset)
    }

    pub fn language_ranges(&self, range: Option<SourceRange>) -> Vec<LanguageRange> {
        language_ranges(self.text, self.regions(), range)
    }

    pub fn languages(&self) -> Vec<CompactString> {
        languages_in_document(self.regions())
    }

    pub fn language_range_of_kind(&self, kind: BlockKind) -> Option<LanguageRange> {
        language_range_of_kind(self.regions(), kind)
    }
}
