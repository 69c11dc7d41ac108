//! Entry array construction from decoded record blocks.
//!
//! Folder and file blocks are decoded strictly in order, each with its own
//! name chain. Parent references are validated as they are read, and the
//! folder graph is checked for cycles once the whole block is in.

use std::collections::BTreeMap;
use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{DatabaseError, Field, FormatError, RecordRef, Result};
use crate::format::{BlockCursor, Header, NameDecoder};
use crate::types::{Entry, EntryKind, Folder, IndexFlags, SortedArray};

/// Smallest possible folder record: reserved field, empty name, parent.
const MIN_FOLDER_RECORD: usize = 8;
/// Smallest possible file record: empty name, parent.
const MIN_FILE_RECORD: usize = 6;

/// Builds the folder and file arrays described by a header.
pub(crate) struct HierarchyBuilder {
    flags: IndexFlags,
    folder_count: u32,
    file_count: u32,
}

/// Fields common to folder and file records.
struct RecordFields {
    name: Box<str>,
    size: i64,
    mtime: Option<i64>,
    parent: u32,
}

impl HierarchyBuilder {
    pub fn new(header: &Header) -> Self {
        Self {
            flags: header.index_flags,
            folder_count: header.folder_count,
            file_count: header.file_count,
        }
    }

    /// Decodes the whole folder block.
    pub fn build_folders(&self, block: &[u8]) -> std::result::Result<Vec<Folder>, FormatError> {
        let mut cursor = BlockCursor::new(block);
        let mut names = NameDecoder::new();
        let mut folders =
            Vec::with_capacity((self.folder_count as usize).min(block.len() / MIN_FOLDER_RECORD));

        for index in 0..self.folder_count {
            cursor.enter_record(RecordRef::new(EntryKind::Folder, index));
            // Reserved, currently unused by every producer.
            cursor.read_u16(Field::Reserved)?;
            let fields = self.read_record(&mut cursor, &mut names)?;

            let parent = if fields.parent == index {
                None
            } else if fields.parent < self.folder_count {
                Some(fields.parent)
            } else {
                return Err(FormatError::InvalidParentIndex {
                    record: RecordRef::new(EntryKind::Folder, index),
                    parent: fields.parent,
                    folder_count: self.folder_count,
                });
            };

            folders.push(Folder::new(Entry::new(
                EntryKind::Folder,
                index,
                fields.name,
                fields.size,
                fields.mtime,
                parent,
            )));
        }

        finish_block(&cursor, EntryKind::Folder)?;
        check_acyclic(&folders)?;
        Ok(folders)
    }

    /// Decodes the whole file block. Every file must live in a folder.
    pub fn build_files(&self, block: &[u8]) -> std::result::Result<Vec<Entry>, FormatError> {
        let mut cursor = BlockCursor::new(block);
        let mut names = NameDecoder::new();
        let mut files =
            Vec::with_capacity((self.file_count as usize).min(block.len() / MIN_FILE_RECORD));

        for index in 0..self.file_count {
            cursor.enter_record(RecordRef::new(EntryKind::File, index));
            let fields = self.read_record(&mut cursor, &mut names)?;

            if fields.parent >= self.folder_count {
                return Err(FormatError::InvalidParentIndex {
                    record: RecordRef::new(EntryKind::File, index),
                    parent: fields.parent,
                    folder_count: self.folder_count,
                });
            }

            files.push(Entry::new(
                EntryKind::File,
                index,
                fields.name,
                fields.size,
                fields.mtime,
                Some(fields.parent),
            ));
        }

        finish_block(&cursor, EntryKind::File)?;
        Ok(files)
    }

    fn read_record(
        &self,
        cursor: &mut BlockCursor<'_>,
        names: &mut NameDecoder,
    ) -> std::result::Result<RecordFields, FormatError> {
        names.decode(cursor)?;
        let name = names.current_name();

        let size = if self.flags.has_size() {
            cursor.read_i64(Field::Size)?
        } else {
            0
        };
        let mtime = if self.flags.has_modification_time() {
            Some(cursor.read_i64(Field::ModificationTime)?)
        } else {
            None
        };
        let parent = cursor.read_u32(Field::ParentIndex)?;

        Ok(RecordFields {
            name,
            size,
            mtime,
            parent,
        })
    }

    /// Reads the sorted-array section that follows the file block.
    pub fn read_sorted_arrays<R: Read>(&self, reader: &mut R) -> Result<BTreeMap<u32, SortedArray>> {
        let count = reader
            .read_u32::<LittleEndian>()
            .map_err(DatabaseError::reading(Field::SortedArrayCount))?;

        let mut arrays = BTreeMap::new();
        for _ in 0..count {
            let id = reader
                .read_u32::<LittleEndian>()
                .map_err(DatabaseError::reading(Field::SortedArrayId))?;

            let mut folders = vec![0u32; self.folder_count as usize];
            reader
                .read_u32_into::<LittleEndian>(&mut folders)
                .map_err(DatabaseError::reading(Field::SortedFolderIndices))?;

            let mut files = vec![0u32; self.file_count as usize];
            reader
                .read_u32_into::<LittleEndian>(&mut files)
                .map_err(DatabaseError::reading(Field::SortedFileIndices))?;

            log::trace!("read sorted array {id}");
            arrays.insert(id, SortedArray { id, folders, files });
        }
        Ok(arrays)
    }
}

fn finish_block(cursor: &BlockCursor<'_>, kind: EntryKind) -> std::result::Result<(), FormatError> {
    if !cursor.is_exhausted() {
        return Err(FormatError::BlockSizeMismatch {
            kind,
            consumed: cursor.position() as u64,
            declared: (cursor.position() + cursor.remaining()) as u64,
        });
    }
    log::trace!("{} block consumed {} bytes", kind.as_str(), cursor.position());
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unseen,
    OnChain,
    Done,
}

/// Verifies every folder's parent chain ends at a root.
///
/// Each folder is walked at most once; a walk that runs into a folder still
/// on the current chain has found a cycle.
fn check_acyclic(folders: &[Folder]) -> std::result::Result<(), FormatError> {
    let mut state = vec![Visit::Unseen; folders.len()];
    let mut chain = Vec::new();

    for start in 0..folders.len() {
        let mut current = start;
        loop {
            match state[current] {
                Visit::Done => break,
                Visit::OnChain => {
                    return Err(FormatError::ParentCycle {
                        folder: current as u32,
                    })
                }
                Visit::Unseen => {
                    state[current] = Visit::OnChain;
                    chain.push(current);
                    match folders[current].parent() {
                        Some(parent) => current = parent as usize,
                        None => break,
                    }
                }
            }
        }
        for visited in chain.drain(..) {
            state[visited] = Visit::Done;
        }
    }
    Ok(())
}
