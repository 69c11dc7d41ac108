use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::format::MAGIC;
use crate::types::EntryKind;

/// Field or record component being decoded when a short read happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Magic,
    MajorVersion,
    MinorVersion,
    IndexFlags,
    FolderCount,
    FileCount,
    FolderBlockSize,
    FileBlockSize,
    IndexCount,
    ExcludeCount,
    FolderBlock,
    FileBlock,
    Reserved,
    NameHeader,
    NameSuffix,
    Size,
    ModificationTime,
    ParentIndex,
    SortedArrayCount,
    SortedArrayId,
    SortedFolderIndices,
    SortedFileIndices,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Magic => "magic number",
            Self::MajorVersion => "major version",
            Self::MinorVersion => "minor version",
            Self::IndexFlags => "index flags",
            Self::FolderCount => "folder count",
            Self::FileCount => "file count",
            Self::FolderBlockSize => "folder block size",
            Self::FileBlockSize => "file block size",
            Self::IndexCount => "index count",
            Self::ExcludeCount => "exclude count",
            Self::FolderBlock => "folder block",
            Self::FileBlock => "file block",
            Self::Reserved => "reserved field",
            Self::NameHeader => "name header",
            Self::NameSuffix => "name data",
            Self::Size => "size",
            Self::ModificationTime => "modification time",
            Self::ParentIndex => "parent index",
            Self::SortedArrayCount => "sorted array count",
            Self::SortedArrayId => "sorted array id",
            Self::SortedFolderIndices => "sorted folder indices",
            Self::SortedFileIndices => "sorted file indices",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a record inside its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRef {
    pub kind: EntryKind,
    pub index: u32,
}

impl RecordRef {
    pub fn new(kind: EntryKind, index: u32) -> Self {
        Self { kind, index }
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.kind.as_str(), self.index)
    }
}

fn at_record(record: &Option<RecordRef>) -> String {
    match record {
        Some(record) => format!(" of {record}"),
        None => String::new(),
    }
}

/// Structural problems in a database file. None of them is recoverable: a
/// corrupt block invalidates the whole file.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error(
        "invalid magic number: got \"{}\", expected \"{}\"",
        .found.escape_ascii(),
        MAGIC.escape_ascii()
    )]
    BadMagic { found: [u8; 4] },

    #[error("unsupported major version: got {found}, expected {supported}")]
    UnsupportedMajorVersion { found: u8, supported: u8 },

    #[error("unsupported minor version: got {found}, expected <= {max_supported}")]
    UnsupportedMinorVersion { found: u8, max_supported: u8 },

    #[error("truncated while reading {field}{}", at_record(.record))]
    Truncated {
        field: Field,
        record: Option<RecordRef>,
    },

    #[error("{record} references parent folder {parent}, but only {folder_count} folders exist")]
    InvalidParentIndex {
        record: RecordRef,
        parent: u32,
        folder_count: u32,
    },

    #[error("{} block size mismatch: read {consumed} bytes, expected {declared}", .kind.as_str())]
    BlockSizeMismatch {
        kind: EntryKind,
        consumed: u64,
        declared: u64,
    },

    #[error("folder #{folder} is part of a parent cycle")]
    ParentCycle { folder: u32 },
}

impl FormatError {
    pub(crate) fn truncated(field: Field) -> Self {
        Self::Truncated {
            field,
            record: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("failed to open database file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl DatabaseError {
    /// Only a failed open may succeed on a second attempt; format errors are
    /// properties of the file itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// Maps a failed read of `field`, turning a short read into `Truncated`.
    pub(crate) fn reading(field: Field) -> impl FnOnce(io::Error) -> Self {
        move |error| {
            if error.kind() == io::ErrorKind::UnexpectedEof {
                FormatError::truncated(field).into()
            } else {
                Self::Io(error)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
