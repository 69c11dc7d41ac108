//! Header and metadata reader.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{DatabaseError, Field, FormatError, Result};
use crate::types::IndexFlags;

/// File signature.
pub const MAGIC: &[u8; 4] = b"FSDB";

/// The only major version this crate reads. Major versions are not
/// compatible with each other in either direction.
pub const MAJOR_VERSION: u8 = 0;

/// Highest minor version this crate understands. Minor versions only add,
/// so anything older is accepted.
pub const MINOR_VERSION: u8 = 9;

/// Bytes from the start of the file to the first folder record.
pub const HEADER_SIZE: usize = 46;

/// Upper bound on the up-front allocation for a block; larger blocks grow
/// while reading so a corrupt size field cannot trigger a huge allocation.
const BLOCK_PREALLOC_LIMIT: u64 = 16 * 1024 * 1024;

/// Validated header plus metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub major_version: u8,
    pub minor_version: u8,
    pub index_flags: IndexFlags,
    pub folder_count: u32,
    pub file_count: u32,
    pub folder_block_size: u64,
    pub file_block_size: u64,
    /// Reserved, written as zero by current producers. Not validated.
    pub index_count: u32,
    /// Reserved, written as zero by current producers. Not validated.
    pub exclude_count: u32,
}

impl Header {
    /// Reads and validates the header and metadata from the start of `reader`.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(DatabaseError::reading(Field::Magic))?;
        if &magic != MAGIC {
            return Err(FormatError::BadMagic { found: magic }.into());
        }

        let major_version = reader
            .read_u8()
            .map_err(DatabaseError::reading(Field::MajorVersion))?;
        if major_version != MAJOR_VERSION {
            return Err(FormatError::UnsupportedMajorVersion {
                found: major_version,
                supported: MAJOR_VERSION,
            }
            .into());
        }

        let minor_version = reader
            .read_u8()
            .map_err(DatabaseError::reading(Field::MinorVersion))?;
        if minor_version > MINOR_VERSION {
            return Err(FormatError::UnsupportedMinorVersion {
                found: minor_version,
                max_supported: MINOR_VERSION,
            }
            .into());
        }

        let index_flags = IndexFlags::from_bits_retain(read_u64(reader, Field::IndexFlags)?);
        let folder_count = read_u32(reader, Field::FolderCount)?;
        let file_count = read_u32(reader, Field::FileCount)?;
        let folder_block_size = read_u64(reader, Field::FolderBlockSize)?;
        let file_block_size = read_u64(reader, Field::FileBlockSize)?;
        let index_count = read_u32(reader, Field::IndexCount)?;
        let exclude_count = read_u32(reader, Field::ExcludeCount)?;

        Ok(Self {
            major_version,
            minor_version,
            index_flags,
            folder_count,
            file_count,
            folder_block_size,
            file_block_size,
            index_count,
            exclude_count,
        })
    }
}

fn read_u32<R: Read>(reader: &mut R, field: Field) -> Result<u32> {
    reader
        .read_u32::<LittleEndian>()
        .map_err(DatabaseError::reading(field))
}

fn read_u64<R: Read>(reader: &mut R, field: Field) -> Result<u64> {
    reader
        .read_u64::<LittleEndian>()
        .map_err(DatabaseError::reading(field))
}

/// Reads exactly `size` bytes of a record block.
pub(crate) fn read_block<R: Read>(reader: &mut R, size: u64, field: Field) -> Result<Vec<u8>> {
    let mut block = Vec::with_capacity(size.min(BLOCK_PREALLOC_LIMIT) as usize);
    reader
        .by_ref()
        .take(size)
        .read_to_end(&mut block)
        .map_err(DatabaseError::reading(field))?;
    if block.len() as u64 != size {
        return Err(FormatError::truncated(field).into());
    }
    Ok(block)
}
