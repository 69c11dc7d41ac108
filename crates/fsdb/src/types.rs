//! Entry types for a loaded database.
//!
//! Folders and files share the common [`Entry`] record; folders wrap it with
//! the extra counters the format reserves for them. Parents are referenced
//! by index into the folder array, never by pointer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Which optional per-entry fields are physically present in the file.
    ///
    /// Unknown bits are retained verbatim so the value can be reported back.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IndexFlags: u64 {
        const NAME = 1 << 0;
        const PATH = 1 << 1;
        const SIZE = 1 << 2;
        const MODIFICATION_TIME = 1 << 3;
        const ACCESS_TIME = 1 << 4;
        const CREATION_TIME = 1 << 5;
        const STATUS_CHANGE_TIME = 1 << 6;
    }
}

impl IndexFlags {
    /// Returns true if records carry an 8-byte size.
    #[inline]
    pub fn has_size(self) -> bool {
        self.contains(Self::SIZE)
    }

    /// Returns true if records carry an 8-byte modification time.
    #[inline]
    pub fn has_modification_time(self) -> bool {
        self.contains(Self::MODIFICATION_TIME)
    }
}

/// Entry kind enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Folder,
    File,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

/// Identity of an entry: its kind plus its position in the matching array.
///
/// Names are not unique, so anything keyed per entry (the path cache, for
/// one) uses this instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId {
    pub kind: EntryKind,
    pub index: u32,
}

impl EntryId {
    #[inline]
    pub fn folder(index: u32) -> Self {
        Self {
            kind: EntryKind::Folder,
            index,
        }
    }

    #[inline]
    pub fn file(index: u32) -> Self {
        Self {
            kind: EntryKind::File,
            index,
        }
    }
}

/// A file or folder record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: Box<str>,
    size: i64,
    /// `None` when the database does not index modification times.
    mtime: Option<i64>,
    parent: Option<u32>,
    index: u32,
    kind: EntryKind,
}

impl Entry {
    pub(crate) fn new(
        kind: EntryKind,
        index: u32,
        name: Box<str>,
        size: i64,
        mtime: Option<i64>,
        parent: Option<u32>,
    ) -> Self {
        Self {
            name,
            size,
            mtime,
            parent,
            index,
            kind,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes; zero when the database does not index sizes.
    #[inline]
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Modification time as Unix seconds; zero when not indexed.
    #[inline]
    pub fn modification_time(&self) -> i64 {
        self.mtime.unwrap_or(0)
    }

    /// Modification time as a UTC timestamp.
    ///
    /// Returns `None` when the database does not index modification times or
    /// the value is out of chrono's range. A stored zero is the Unix epoch.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.mtime.and_then(|seconds| DateTime::from_timestamp(seconds, 0))
    }

    /// Index of the parent folder, or `None` for a root folder.
    #[inline]
    pub fn parent(&self) -> Option<u32> {
        self.parent
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    #[inline]
    pub fn id(&self) -> EntryId {
        EntryId {
            kind: self.kind,
            index: self.index,
        }
    }

    #[inline]
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A folder record.
///
/// `db_index`, `num_files` and `num_folders` exist in the format but carry
/// no data yet; they are always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    entry: Entry,
    db_index: u32,
    num_files: u32,
    num_folders: u32,
}

impl Folder {
    pub(crate) fn new(entry: Entry) -> Self {
        Self {
            entry,
            db_index: 0,
            num_files: 0,
            num_folders: 0,
        }
    }

    #[inline]
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.entry.name()
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.entry.index()
    }

    #[inline]
    pub fn parent(&self) -> Option<u32> {
        self.entry.parent()
    }

    pub fn db_index(&self) -> u32 {
        self.db_index
    }

    pub fn num_files(&self) -> u32 {
        self.num_files
    }

    pub fn num_folders(&self) -> u32 {
        self.num_folders
    }
}

impl AsRef<Entry> for Folder {
    fn as_ref(&self) -> &Entry {
        &self.entry
    }
}

impl AsRef<Entry> for Entry {
    fn as_ref(&self) -> &Entry {
        self
    }
}

/// Precomputed ordering of folders and files for one sort criterion.
///
/// Indices are stored exactly as read; nothing guarantees they are in range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedArray {
    pub id: u32,
    pub folders: Vec<u32>,
    pub files: Vec<u32>,
}

/// Summary counters for a loaded database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    pub folders: usize,
    pub files: usize,
    pub index_flags: u64,
    pub sorted_arrays: usize,
}
