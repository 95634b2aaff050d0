//! Template parse errors.
//!
//! The parser never stops on these: it records them and keeps building the
//! tree, so callers get a best-effort AST plus the list of what went wrong.

use serde::Serialize;
use thiserror::Error;

/// Error codes for template parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum ErrorCode {
    EofInTag,
    EofInComment,
    EofInInterpolation,
    MissingEndTag,
    InvalidEndTag,
    MissingAttributeValue,
    UnexpectedCharacterInTag,
}

/// A structural problem found while parsing a template
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum TemplateParseError {
    #[error("unexpected end of input inside a tag at offset {offset}")]
    EofInTag { offset: u32 },

    #[error("unterminated comment starting at offset {offset}")]
    EofInComment { offset: u32 },

    #[error("unterminated interpolation starting at offset {offset}")]
    EofInInterpolation { offset: u32 },

    #[error("element <{tag}> opened at offset {offset} is missing its end tag")]
    MissingEndTag { tag: String, offset: u32 },

    #[error("end tag </{tag}> at offset {offset} has no matching start tag")]
    InvalidEndTag { tag: String, offset: u32 },

    #[error("attribute value expected at offset {offset}")]
    MissingAttributeValue { offset: u32 },

    #[error("{message} (offset {offset})")]
    UnexpectedCharacterInTag { message: String, offset: u32 },
}

impl TemplateParseError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EofInTag { .. } => ErrorCode::EofInTag,
            Self::EofInComment { .. } => ErrorCode::EofInComment,
            Self::EofInInterpolation { .. } => ErrorCode::EofInInterpolation,
            Self::MissingEndTag { .. } => ErrorCode::MissingEndTag,
            Self::InvalidEndTag { .. } => ErrorCode::InvalidEndTag,
            Self::MissingAttributeValue { .. } => ErrorCode::MissingAttributeValue,
            Self::UnexpectedCharacterInTag { .. } => ErrorCode::UnexpectedCharacterInTag,
        }
    }

    /// Byte offset the error is anchored at
    pub fn offset(&self) -> u32 {
        match self {
            Self::EofInTag { offset }
            | Self::EofInComment { offset }
            | Self::EofInInterpolation { offset }
            | Self::MissingEndTag { offset, .. }
            | Self::InvalidEndTag { offset, .. }
            | Self::MissingAttributeValue { offset }
            | Self::UnexpectedCharacterInTag { offset, .. } => *offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TemplateParseError::MissingEndTag {
            tag: "div".into(),
            offset: 3,
        };
        assert_eq!(
            err.to_string(),
            "element <div> opened at offset 3 is missing its end tag"
        );
        assert_eq!(err.code(), ErrorCode::MissingEndTag);
        assert_eq!(err.offset(), 3);
    }
}
