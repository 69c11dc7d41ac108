//! Bounds-checked reads over an in-memory record block.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Field, FormatError, RecordRef};

/// Sequential reader over one record block.
///
/// Every read is checked against the block end, and a failed read reports the
/// field plus the record currently being decoded.
#[derive(Debug)]
pub struct BlockCursor<'a> {
    block: &'a [u8],
    offset: usize,
    record: Option<RecordRef>,
}

impl<'a> BlockCursor<'a> {
    pub fn new(block: &'a [u8]) -> Self {
        Self {
            block,
            offset: 0,
            record: None,
        }
    }

    /// Sets the record that subsequent errors are attributed to.
    #[inline]
    pub fn enter_record(&mut self, record: RecordRef) {
        self.record = Some(record);
    }

    #[inline]
    pub fn record(&self) -> Option<RecordRef> {
        self.record
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.block.len() - self.offset
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.offset == self.block.len()
    }

    /// Takes the next `len` bytes.
    pub fn take(&mut self, len: usize, field: Field) -> Result<&'a [u8], FormatError> {
        if len > self.remaining() {
            return Err(self.truncated(field));
        }
        let bytes = &self.block[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self, field: Field) -> Result<u8, FormatError> {
        Ok(self.take(1, field)?[0])
    }

    pub fn read_u16(&mut self, field: Field) -> Result<u16, FormatError> {
        Ok(LittleEndian::read_u16(self.take(2, field)?))
    }

    pub fn read_u32(&mut self, field: Field) -> Result<u32, FormatError> {
        Ok(LittleEndian::read_u32(self.take(4, field)?))
    }

    pub fn read_i64(&mut self, field: Field) -> Result<i64, FormatError> {
        Ok(LittleEndian::read_i64(self.take(8, field)?))
    }

    pub(crate) fn truncated(&self, field: Field) -> FormatError {
        FormatError::Truncated {
            field,
            record: self.record,
        }
    }
}
