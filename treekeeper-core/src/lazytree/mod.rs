//! Lazy Tree (§4.3): an in-memory, copy-on-write mutable view over a
//! committed tree with path-addressed edits.

use std::collections::BTreeMap;

use crate::error::PlumbingError;
use crate::plumbing::{self, FileRecord, GitRunner};

/// A mutable view over a tree rooted either empty or at an existing
/// tree-hash. Edits are buffered in memory; `hash()` materializes them via
/// `MakeTree` and caches the result until the next edit.
pub struct LazyTree<'a> {
    runner: &'a GitRunner,
    /// The full, current file set. Kept flat (not nested) since `MakeTree`
    /// itself handles nesting; this struct only owns the "which files exist
    /// right now" bookkeeping and a cache of the last computed hash.
    files: BTreeMap<Vec<u8>, FileRecord>,
    cached_hash: Option<String>,
}

impl<'a> LazyTree<'a> {
    /// Rooted at an existing tree-hash. Pass [`plumbing::NONE`] for an empty
    /// tree.
    pub fn from_tree(runner: &'a GitRunner, tree: &str) -> Result<Self, PlumbingError> {
        let files = if plumbing::is_none(tree) {
            BTreeMap::new()
        } else {
            // A tree hash can be listed the same way a commit's tree can:
            // `ls-tree -r` accepts any tree-ish.
            let raw_files = crate::plumbing::list_files(runner, tree).map_err(PlumbingError::from)?;
            raw_files.into_iter().map(|f| (f.path.clone(), f)).collect()
        };
        Ok(Self {
            runner,
            files,
            cached_hash: Some(tree.to_string()).filter(|_| !plumbing::is_none(tree)),
        })
    }

    pub fn empty(runner: &'a GitRunner) -> Self {
        Self {
            runner,
            files: BTreeMap::new(),
            cached_hash: None,
        }
    }

    /// After `set(p, f)`, the next `hash()` reflects `{p -> f}` replacing
    /// any prior entry at `p` (§4.3).
    pub fn set(&mut self, file: FileRecord) {
        self.files.insert(file.path.clone(), file);
        self.cached_hash = None;
    }

    /// Deleting a non-existent path is a no-op, not an error (§4.3).
    pub fn delete(&mut self, path: &[u8]) {
        if self.files.remove(path).is_some() {
            self.cached_hash = None;
        }
    }

    /// Idempotent between edits (§4.3): materializes dirty state via
    /// `MakeTree` and caches the hash.
    pub fn hash(&mut self) -> Result<String, PlumbingError> {
        if let Some(h) = &self.cached_hash {
            return Ok(h.clone());
        }
        let files: Vec<FileRecord> = self.files.values().cloned().collect();
        let hash = crate::plumbing::make_tree(self.runner, &files).map_err(PlumbingError::from)?;
        self.cached_hash = Some(hash.clone());
        Ok(hash)
    }

    pub fn files(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }
}
