//! Binary layout of the database file.
//!
//! - `header` - magic, versions and the fixed-size metadata that follows
//! - `cursor` - bounds-checked little-endian reads over an in-memory block
//! - `name` - delta (shared-prefix) name reconstruction

mod cursor;
mod header;
mod name;

pub use cursor::BlockCursor;
pub use header::{Header, HEADER_SIZE, MAGIC, MAJOR_VERSION, MINOR_VERSION};
pub use name::{decode_name, NameDecoder};

pub(crate) use header::read_block;
