//! Reader and search engine for FSDB filesystem index files.
//!
//! This crate provides:
//! - Decoding of the binary index format (header, delta-compressed names,
//!   folder and file blocks, sorted arrays)
//! - Parent-linked folder hierarchy with lazily memoized full paths
//! - Name and path search with substring, whole-word and wildcard matching

pub mod database;
pub mod error;
pub mod format;
mod hierarchy;
pub mod matcher;
pub mod path;
pub mod search;
pub mod types;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use database::{load, Database, LoadOptions};
pub use error::{DatabaseError, Field, FormatError, RecordRef, Result};
pub use matcher::{has_wildcards, wildcard_to_pattern, CompiledQuery, MatchOptions};
pub use path::PathCache;
pub use search::{SearchOptions, SearchResult};
pub use types::{DatabaseStats, Entry, EntryId, EntryKind, Folder, IndexFlags, SortedArray};
pub use view::EntryView;
