//! Borrowed views over database entries.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::database::Database;
use crate::types::{Entry, EntryId, EntryKind};

/// An entry together with the database it belongs to, so derived
/// properties like the parent and full path can be computed on demand.
#[derive(Clone, Copy)]
pub struct EntryView<'a> {
    database: &'a Database,
    entry: &'a Entry,
}

impl<'a> EntryView<'a> {
    #[inline]
    pub(crate) fn new(database: &'a Database, entry: &'a Entry) -> Self {
        Self { database, entry }
    }

    #[inline]
    pub fn entry(&self) -> &'a Entry {
        self.entry
    }

    #[inline]
    pub fn id(&self) -> EntryId {
        self.entry.id()
    }

    #[inline]
    pub fn name(&self) -> &'a str {
        self.entry.name()
    }

    #[inline]
    pub fn kind(&self) -> EntryKind {
        self.entry.kind()
    }

    #[inline]
    pub fn size(&self) -> i64 {
        self.entry.size()
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.entry.modified_at()
    }

    /// The containing folder, or `None` for a root.
    pub fn parent(&self) -> Option<EntryView<'a>> {
        self.database
            .parent_of(self.entry)
            .map(|folder| EntryView::new(self.database, folder.entry()))
    }

    /// Number of ancestors; zero for a root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(view) = current {
            depth += 1;
            current = view.parent();
        }
        depth
    }

    /// Full path, resolved through the database's path cache.
    pub fn full_path(&self) -> Arc<str> {
        self.database.resolve_path(self.entry)
    }
}

impl std::fmt::Debug for EntryView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryView")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}
