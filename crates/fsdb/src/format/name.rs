//! Delta name reconstruction.
//!
//! Each record stores its name as `(shared prefix length, suffix length,
//! suffix bytes)` against the full name of the record before it in the same
//! block. The chain starts empty at the beginning of every block.

use crate::error::{Field, FormatError};

use super::cursor::BlockCursor;

/// Longest name a record can produce: a full 255-byte prefix plus a 255-byte suffix.
const MAX_NAME_LEN: usize = 510;

/// Rebuilds names record by record, keeping the previous name in a reusable buffer.
///
/// Prefixes are applied to raw bytes: a producer computes the shared prefix
/// byte-wise, so a prefix may end inside a multi-byte character that the
/// suffix then completes.
#[derive(Debug)]
pub struct NameDecoder {
    current: Vec<u8>,
}

impl Default for NameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NameDecoder {
    pub fn new() -> Self {
        Self {
            current: Vec::with_capacity(MAX_NAME_LEN),
        }
    }

    /// Decodes the next delta record at the cursor and returns the full name bytes.
    ///
    /// A shared-prefix length beyond the previous name keeps the whole
    /// previous name instead of failing.
    pub fn decode(&mut self, cursor: &mut BlockCursor<'_>) -> Result<&[u8], FormatError> {
        let header = cursor.take(2, Field::NameHeader)?;
        let shared = usize::from(header[0]);
        let suffix_len = usize::from(header[1]);
        let suffix = cursor.take(suffix_len, Field::NameSuffix)?;

        self.current.truncate(shared);
        self.current.extend_from_slice(suffix);
        Ok(&self.current)
    }

    /// The most recently decoded name.
    pub fn current(&self) -> &[u8] {
        &self.current
    }

    /// The most recently decoded name as an owned string.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; the raw bytes stay in
    /// the chain so later records still decode against what was written.
    pub fn current_name(&self) -> Box<str> {
        String::from_utf8_lossy(&self.current).into()
    }
}

/// Decodes one delta record from `input` against `previous`.
///
/// Returns the full name and the number of bytes consumed.
pub fn decode_name(previous: &[u8], input: &[u8]) -> Result<(Vec<u8>, usize), FormatError> {
    let mut decoder = NameDecoder {
        current: previous.to_vec(),
    };
    let mut cursor = BlockCursor::new(input);
    decoder.decode(&mut cursor)?;
    Ok((decoder.current, cursor.position()))
}
