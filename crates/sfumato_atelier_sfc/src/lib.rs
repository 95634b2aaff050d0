//! Atelier SFC - Region extraction and virtual documents for Vue SFCs.
//!
//! [`extract_regions`] splits a `.vue` document into tagged byte ranges.
//! The functions in [`virtual_document`] turn those ranges into
//! same-length, whitespace-blanked documents for per-language tooling, and
//! answer "which language is at this offset" queries for request routing.

pub mod regions;
pub mod virtual_document;

pub use regions::{extract_regions, language_from_lang_attr, BlockKind, Region, SfcRegions};
pub use virtual_document::{
    blank, language_at, language_range_of_kind, language_ranges, languages_in_document,
    single_kind_document, virtual_document, DocumentMeta, LanguageRange, Selector, SfcDocument,
    VirtualDocument, HOST_LANGUAGE,
};
