//! Carton - The artist's toolbox for sfumato.
//!
//! This crate holds the small shared pieces every other sfumato crate reaches
//! for: byte spans, a line index for turning offsets into editor positions,
//! and re-exports of the collection types used across the workspace.
//!
//! # Example
//!
//! ```
//! use sfumato_carton::{LineIndex, SourceRange};
//!
//! let text = "<template>\n  <div/>\n</template>";
//! let range = SourceRange::new(10, 20);
//! assert_eq!(range.len(), 10);
//!
//! let index = LineIndex::new(text);
//! let pos = index.position_of(13);
//! assert_eq!((pos.line, pos.column), (1, 2));
//! ```

pub mod line_index;
pub mod source_range;

pub use line_index::{LineIndex, LinePosition};
pub use source_range::SourceRange;

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;
pub use compact_str::CompactString as String;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};
