//! The loaded database and its load pipeline.
//!
//! Loading is one sequential pass over the file:
//! 1. `Header::read` validates magic and versions and reads block sizes
//! 2. the folder block is read whole and decoded into the folder array
//! 3. the file block is read whole and decoded into the file array
//! 4. the sorted-array section is read (or skipped, see `LoadOptions`)
//!
//! After that the database is immutable; only the path cache fills in lazily.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use crate::error::{DatabaseError, Field, Result};
use crate::format::{read_block, Header};
use crate::hierarchy::HierarchyBuilder;
use crate::path::PathCache;
use crate::types::{
    DatabaseStats, Entry, EntryId, EntryKind, Folder, IndexFlags, SortedArray,
};
use crate::view::EntryView;

/// Knobs for loading a database file.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Read the sorted-array section. When false it is skipped and
    /// `sorted_array_count` reports zero.
    pub load_sorted_arrays: bool,
    /// Capacity of the buffered reader used for the load pass.
    pub buffer_capacity: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            load_sorted_arrays: true,
            buffer_capacity: 64 * 1024,
        }
    }
}

/// A fully decoded database file.
#[derive(Debug)]
pub struct Database {
    header: Header,
    folders: Vec<Folder>,
    files: Vec<Entry>,
    sorted_arrays: BTreeMap<u32, SortedArray>,
    paths: PathCache,
}

/// Loads a database file with default options.
pub fn load(path: impl AsRef<Path>) -> Result<Database> {
    Database::load(path)
}

impl Database {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, &LoadOptions::default())
    }

    pub fn load_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatabaseError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::with_capacity(options.buffer_capacity, file);

        let database = Self::from_reader(reader, options)?;
        log::debug!(
            "loaded database {} ({} folders, {} files)",
            path.display(),
            database.folder_count(),
            database.file_count()
        );
        Ok(database)
    }

    /// Decodes a database from any byte source positioned at the header.
    pub fn from_reader<R: Read>(mut reader: R, options: &LoadOptions) -> Result<Self> {
        let header = Header::read(&mut reader)?;
        log::debug!(
            "database header: version {}.{}, flags {:#x}, {} folders ({} bytes), {} files ({} bytes)",
            header.major_version,
            header.minor_version,
            header.index_flags.bits(),
            header.folder_count,
            header.folder_block_size,
            header.file_count,
            header.file_block_size
        );

        let builder = HierarchyBuilder::new(&header);

        let folder_block = read_block(&mut reader, header.folder_block_size, Field::FolderBlock)?;
        let folders = builder.build_folders(&folder_block)?;
        drop(folder_block);

        let file_block = read_block(&mut reader, header.file_block_size, Field::FileBlock)?;
        let files = builder.build_files(&file_block)?;
        drop(file_block);

        let sorted_arrays = if options.load_sorted_arrays {
            builder.read_sorted_arrays(&mut reader)?
        } else {
            BTreeMap::new()
        };
        log::debug!("database has {} sorted arrays", sorted_arrays.len());

        Ok(Self {
            header,
            folders,
            files,
            sorted_arrays,
            paths: PathCache::new(),
        })
    }

    // -------------------------------------------------------------------------
    // Statistics
    // -------------------------------------------------------------------------

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns `(major, minor)` as stored in the file.
    pub fn version(&self) -> (u8, u8) {
        (self.header.major_version, self.header.minor_version)
    }

    pub fn index_flags(&self) -> IndexFlags {
        self.header.index_flags
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn sorted_array_count(&self) -> usize {
        self.sorted_arrays.len()
    }

    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            folders: self.folder_count(),
            files: self.file_count(),
            index_flags: self.index_flags().bits(),
            sorted_arrays: self.sorted_array_count(),
        }
    }

    // -------------------------------------------------------------------------
    // Entries
    // -------------------------------------------------------------------------

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn files(&self) -> &[Entry] {
        &self.files
    }

    pub fn folder(&self, index: u32) -> Option<&Folder> {
        self.folders.get(index as usize)
    }

    pub fn file(&self, index: u32) -> Option<&Entry> {
        self.files.get(index as usize)
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        match id.kind {
            EntryKind::Folder => self.folder(id.index).map(Folder::entry),
            EntryKind::File => self.file(id.index),
        }
    }

    /// Folders without a parent.
    pub fn roots(&self) -> impl Iterator<Item = &Folder> {
        self.folders.iter().filter(|folder| folder.parent().is_none())
    }

    pub fn parent_of(&self, entry: &Entry) -> Option<&Folder> {
        entry.parent().and_then(|index| self.folder(index))
    }

    pub fn view(&self, id: EntryId) -> Option<EntryView<'_>> {
        self.entry(id).map(|entry| EntryView::new(self, entry))
    }

    // -------------------------------------------------------------------------
    // Paths
    // -------------------------------------------------------------------------

    /// Full slash-delimited path of an entry.
    pub fn full_path(&self, id: EntryId) -> Option<Arc<str>> {
        self.entry(id).map(|entry| self.resolve_path(entry))
    }

    /// Resolves a path for an entry owned by this database.
    pub(crate) fn resolve_path(&self, entry: &Entry) -> Arc<str> {
        self.paths.resolve(&self.folders, entry)
    }

    pub fn cached_path_count(&self) -> usize {
        self.paths.len()
    }

    /// Parent links followed by path resolution so far.
    pub fn path_parent_steps(&self) -> u64 {
        self.paths.parent_steps()
    }

    // -------------------------------------------------------------------------
    // Sorted arrays
    // -------------------------------------------------------------------------

    pub fn sorted_array(&self, id: u32) -> Option<&SortedArray> {
        self.sorted_arrays.get(&id)
    }

    pub fn sorted_arrays(&self) -> impl Iterator<Item = &SortedArray> {
        self.sorted_arrays.values()
    }

    /// Folders in the order of sorted array `id`. Out-of-range indices are skipped.
    pub fn sorted_folders(&self, id: u32) -> Option<impl Iterator<Item = &Folder>> {
        let array = self.sorted_arrays.get(&id)?;
        Some(array.folders.iter().filter_map(move |&index| self.folder(index)))
    }

    /// Files in the order of sorted array `id`. Out-of-range indices are skipped.
    pub fn sorted_files(&self, id: u32) -> Option<impl Iterator<Item = &Entry>> {
        let array = self.sorted_arrays.get(&id)?;
        Some(array.files.iter().filter_map(move |&index| self.file(index)))
    }
}
