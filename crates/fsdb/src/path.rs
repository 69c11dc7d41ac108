//! Full path resolution with a shared memo table.
//!
//! A path is built by one upward walk from the entry, stopping at the first
//! ancestor whose path is already cached (or at a root). Every path computed
//! on the way down is cached, so siblings and descendants reuse the prefix.
//! Entries never change after load, so cached paths never go stale.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fnv::FnvHashMap;
use parking_lot::RwLock;

use crate::types::{Entry, EntryId, Folder};

/// Path memo table keyed by entry identity, safe for concurrent readers.
#[derive(Debug, Default)]
pub struct PathCache {
    paths: RwLock<FnvHashMap<EntryId, Arc<str>>>,
    parent_steps: AtomicU64,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: EntryId) -> Option<Arc<str>> {
        self.paths.read().get(&id).cloned()
    }

    /// Number of cached paths.
    pub fn len(&self) -> usize {
        self.paths.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total parent links followed by all resolutions so far.
    pub fn parent_steps(&self) -> u64 {
        self.parent_steps.load(Ordering::Relaxed)
    }

    /// Returns the full path of `entry`, whose parent chain lives in `folders`.
    pub fn resolve(&self, folders: &[Folder], entry: &Entry) -> Arc<str> {
        if let Some(path) = self.get(entry.id()) {
            return path;
        }

        // Uncached ancestors, nearest first, and the cached path the walk stopped at.
        let mut pending: Vec<&Entry> = Vec::new();
        let mut base: Option<Arc<str>> = None;
        {
            let paths = self.paths.read();
            let mut parent = entry.parent();
            while let Some(index) = parent {
                let Some(folder) = folders.get(index as usize) else {
                    break;
                };
                self.parent_steps.fetch_add(1, Ordering::Relaxed);
                if let Some(path) = paths.get(&folder.entry().id()) {
                    base = Some(Arc::clone(path));
                    break;
                }
                pending.push(folder.entry());
                parent = folder.parent();
            }
        }

        let mut computed = Vec::with_capacity(pending.len() + 1);
        for ancestor in pending.iter().rev() {
            let path = child_or_root(base.as_deref(), ancestor.name());
            computed.push((ancestor.id(), Arc::clone(&path)));
            base = Some(path);
        }
        let path = child_or_root(base.as_deref(), entry.name());
        computed.push((entry.id(), Arc::clone(&path)));

        let mut paths = self.paths.write();
        for (id, computed_path) in computed {
            paths.entry(id).or_insert(computed_path);
        }
        path
    }
}

fn child_or_root(parent_path: Option<&str>, name: &str) -> Arc<str> {
    match parent_path {
        Some(parent_path) => join_path(parent_path, name).into(),
        None => root_path(name).into(),
    }
}

/// Path of a root folder: `/` for the unnamed root, otherwise the bare name.
pub fn root_path(name: &str) -> String {
    if name.is_empty() {
        "/".to_string()
    } else {
        name.to_string()
    }
}

/// Appends `name` to `parent_path` without doubling the root slash.
pub fn join_path(parent_path: &str, name: &str) -> String {
    if parent_path == "/" {
        let mut path = String::with_capacity(name.len() + 1);
        path.push('/');
        path.push_str(name);
        return path;
    }
    let mut path = String::with_capacity(parent_path.len() + name.len() + 1);
    path.push_str(parent_path);
    path.push('/');
    path.push_str(name);
    path
}
