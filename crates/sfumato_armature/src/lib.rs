//! Armature - The structural scanner and template parser for sfumato.
//!
//! Two layers live here:
//!
//! - [`scanner`]: a resumable pull lexer over raw SFC or template text. It
//!   is used once per document by the region extractor and once per
//!   template by the parser.
//! - [`parser`]: builds the `sfumato_relief` template AST from the scanner's
//!   token stream, splitting attributes into plain attributes and
//!   directives.

pub mod parser;
pub mod scanner;

pub use parser::{parse, parse_directive_name, DirectiveName, DirectiveNameArg, ParseResult};
pub use scanner::{Scanner, ScannerSnapshot, ScannerState, Token, TokenType};
