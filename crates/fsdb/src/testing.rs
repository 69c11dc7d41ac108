//! Test fixtures: writes database files from entry descriptions.

use std::io::Cursor;
use std::path::Path;

use crate::database::{Database, LoadOptions};
use crate::format::{MAGIC, MAJOR_VERSION, MINOR_VERSION};
use crate::types::IndexFlags;

#[derive(Debug, Clone)]
pub struct FixtureEntry {
    pub name: String,
    pub size: i64,
    pub mtime: i64,
    /// For folders, the own index marks a root.
    pub parent: u32,
}

/// Builds database bytes record by record.
///
/// Names are delta-encoded against the previous name in the same block the
/// way a producer would. Header fields can be overridden to build broken files.
#[derive(Debug, Clone)]
pub struct FixtureWriter {
    pub magic: [u8; 4],
    pub major_version: u8,
    pub minor_version: u8,
    pub flags: IndexFlags,
    pub folders: Vec<FixtureEntry>,
    pub files: Vec<FixtureEntry>,
    pub sorted_arrays: Vec<(u32, Vec<u32>, Vec<u32>)>,
    /// Declared folder block size; the encoded length when `None`.
    pub folder_block_size: Option<u64>,
    /// Declared file block size; the encoded length when `None`.
    pub file_block_size: Option<u64>,
}

impl FixtureWriter {
    pub fn new(flags: IndexFlags) -> Self {
        Self {
            magic: *MAGIC,
            major_version: MAJOR_VERSION,
            minor_version: MINOR_VERSION,
            flags,
            folders: Vec::new(),
            files: Vec::new(),
            sorted_arrays: Vec::new(),
            folder_block_size: None,
            file_block_size: None,
        }
    }

    pub fn folder(&mut self, name: &str, size: i64, mtime: i64, parent: u32) -> &mut Self {
        self.folders.push(FixtureEntry {
            name: name.to_string(),
            size,
            mtime,
            parent,
        });
        self
    }

    pub fn file(&mut self, name: &str, size: i64, mtime: i64, parent: u32) -> &mut Self {
        self.files.push(FixtureEntry {
            name: name.to_string(),
            size,
            mtime,
            parent,
        });
        self
    }

    pub fn sorted_array(&mut self, id: u32, folders: Vec<u32>, files: Vec<u32>) -> &mut Self {
        self.sorted_arrays.push((id, folders, files));
        self
    }

    pub fn encoded_folder_block(&self) -> Vec<u8> {
        self.encode_block(&self.folders, true)
    }

    pub fn encoded_file_block(&self) -> Vec<u8> {
        self.encode_block(&self.files, false)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let folder_block = self.encoded_folder_block();
        let file_block = self.encoded_file_block();

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.magic);
        bytes.push(self.major_version);
        bytes.push(self.minor_version);
        bytes.extend_from_slice(&self.flags.bits().to_le_bytes());
        bytes.extend_from_slice(&(self.folders.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.files.len() as u32).to_le_bytes());
        let folder_block_size = self
            .folder_block_size
            .unwrap_or(folder_block.len() as u64);
        bytes.extend_from_slice(&folder_block_size.to_le_bytes());
        let file_block_size = self.file_block_size.unwrap_or(file_block.len() as u64);
        bytes.extend_from_slice(&file_block_size.to_le_bytes());
        // Index and exclude counts.
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());

        bytes.extend_from_slice(&folder_block);
        bytes.extend_from_slice(&file_block);

        bytes.extend_from_slice(&(self.sorted_arrays.len() as u32).to_le_bytes());
        for (id, folders, files) in &self.sorted_arrays {
            bytes.extend_from_slice(&id.to_le_bytes());
            for index in folders.iter().chain(files) {
                bytes.extend_from_slice(&index.to_le_bytes());
            }
        }
        bytes
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }

    pub fn load(&self) -> Database {
        Database::from_reader(Cursor::new(self.to_bytes()), &LoadOptions::default()).unwrap()
    }

    fn encode_block(&self, entries: &[FixtureEntry], folders: bool) -> Vec<u8> {
        let mut block = Vec::new();
        let mut previous: &[u8] = &[];
        for entry in entries {
            if folders {
                block.extend_from_slice(&0u16.to_le_bytes());
            }
            let name = entry.name.as_bytes();
            let shared = previous
                .iter()
                .zip(name)
                .take_while(|(a, b)| a == b)
                .count()
                .min(255);
            let suffix = &name[shared..];
            assert!(suffix.len() <= 255, "fixture name suffix too long");
            block.push(shared as u8);
            block.push(suffix.len() as u8);
            block.extend_from_slice(suffix);

            if self.flags.has_size() {
                block.extend_from_slice(&entry.size.to_le_bytes());
            }
            if self.flags.has_modification_time() {
                block.extend_from_slice(&entry.mtime.to_le_bytes());
            }
            block.extend_from_slice(&entry.parent.to_le_bytes());
            previous = name;
        }
        block
    }
}

/// The small tree used across tests:
///
/// ```text
/// /
/// ├── home/user/{test.txt, readme.txt}
/// ├── Documents/{document.pdf, test.go}
/// └── Downloads/file.zip
/// ```
pub fn sample_fixture() -> FixtureWriter {
    let flags = IndexFlags::NAME | IndexFlags::SIZE | IndexFlags::MODIFICATION_TIME;
    let mut fixture = FixtureWriter::new(flags);
    fixture
        .folder("", 0, 0, 0)
        .folder("home", 0, 1_600_000_000, 0)
        .folder("user", 0, 1_600_000_100, 1)
        .folder("Documents", 0, 1_600_000_200, 0)
        .folder("Downloads", 0, 1_600_000_300, 0);
    fixture
        .file("test.txt", 1024, 1_700_000_000, 2)
        .file("readme.txt", 2048, 1_700_000_100, 2)
        .file("document.pdf", 4096, 1_700_000_200, 3)
        .file("test.go", 8192, 1_700_000_300, 3)
        .file("file.zip", 16384, 1_700_000_400, 4);
    fixture
}

pub fn sample_database() -> Database {
    sample_fixture().load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_delta_encoded() {
        let block = sample_fixture().encoded_folder_block();
        // "Downloads" after "Documents" shares "Do".
        let tail = &block[block.len() - (2 + 2 + 7 + 8 + 8 + 4)..];
        assert_eq!(&tail[2..4], &[2, 7]);
        assert_eq!(&tail[4..11], b"wnloads");
    }

    #[test]
    fn test_header_layout() {
        let bytes = sample_fixture().to_bytes();
        assert_eq!(&bytes[..4], b"FSDB");
        assert_eq!(bytes[4], 0);
        assert_eq!(bytes[5], 9);
        assert_eq!(u64::from_le_bytes(bytes[6..14].try_into().unwrap()), 0b1101);
        assert_eq!(u32::from_le_bytes(bytes[14..18].try_into().unwrap()), 5);
    }

    #[test]
    fn test_sample_database_loads() {
        let db = sample_database();
        assert_eq!(db.folder_count(), 5);
        assert_eq!(db.file_count(), 5);
        assert_eq!(db.roots().count(), 1);
    }
}
