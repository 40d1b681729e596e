//! Upstream Branch Driver (§4.5): three independently-invocable phases that
//! reconcile an existing filtered branch head with a (possibly changed)
//! filter configuration and a new upstream target.

use std::collections::HashSet;

use crate::error::{PlumbingError, RewriteError};
use crate::filter::FilterConfig;
use crate::plumbing::{self, FileRecord, GitRunner, Identity};
use crate::rewriter::{HistoryRewriter, RewriteObserver, RewriteOptions};

/// Well-known annotation key used on commits produced by the ADD phase,
/// distinguishing "recovered" history from ordinary `OriginalCommit`-derived
/// commits (§6: outputs).
pub const RECOVERED_FROM_KEY: &str = "RecoveredFromCommit";

const DELETE_MESSAGE: &str = "Remove unnecessary files due to filter change";
const ADD_MESSAGE: &str = "Recover files matched by filter change";

/// Look-forward window used when the ADD phase runs a nested History
/// Rewriter pass over the newly-wanted files (§4.5).
pub const ADD_WINDOW: usize = 1000;

fn driver_identity() -> Identity {
    Identity {
        name: "treekeeper".to_string(),
        email: "treekeeper@localhost".to_string(),
        time: chrono::Utc::now().timestamp(),
        timezone: "+0000".to_string(),
    }
}

fn annotated_message(subject: &str, key: &str, value: &str) -> Vec<u8> {
    let mut message = subject.as_bytes().to_vec();
    message.extend_from_slice(b"\n\n");
    message.extend_from_slice(key.as_bytes());
    message.extend_from_slice(b": ");
    message.extend_from_slice(value.as_bytes());
    message.push(b'\n');
    message
}

/// Drives an existing filtered branch head through DELETE, ADD, and FORWARD
/// against the current filter configuration (§4.5).
pub struct BranchDriver<'a> {
    runner: &'a GitRunner,
    filter: &'a FilterConfig,
}

impl<'a> BranchDriver<'a> {
    pub fn new(runner: &'a GitRunner, filter: &'a FilterConfig) -> Self {
        Self { runner, filter }
    }

    /// DELETE: drops every file in `current` that no longer satisfies
    /// `want`. A no-op (returns `current` unchanged) if nothing is dropped.
    pub fn delete(&self, current: &str, original_cursor: &str) -> Result<String, RewriteError> {
        let files = plumbing::list_files(self.runner, current).map_err(PlumbingError::from)?;
        let kept: Vec<FileRecord> = files
            .iter()
            .filter(|f| self.filter.want(&f.path))
            .cloned()
            .collect();
        if kept.len() == files.len() {
            return Ok(current.to_string());
        }

        let new_tree = plumbing::make_tree(self.runner, &kept).map_err(PlumbingError::from)?;
        let message = annotated_message(
            DELETE_MESSAGE,
            crate::rewriter::DEFAULT_ANNOTATION_KEY,
            original_cursor,
        );
        let hash = plumbing::commit_tree(
            self.runner,
            &new_tree,
            &[current.to_string()],
            &driver_identity(),
            &message,
        )
        .map_err(PlumbingError::from)?;
        Ok(hash)
    }

    /// ADD: recovers files upstream now wants but `current` doesn't carry
    /// yet, by running a nested History Rewriter restricted to exactly
    /// those paths and merging its head into `current` (§4.5).
    pub fn add(
        &self,
        current: &str,
        original_cursor: &str,
        initial_commit: &str,
        observer: &dyn RewriteObserver,
    ) -> Result<String, RewriteError> {
        let current_meta = plumbing::get_metadata(self.runner, current).map_err(PlumbingError::from)?;
        let old_files = plumbing::list_files(self.runner, current).map_err(PlumbingError::from)?;
        let upstream_files = plumbing::list_files(self.runner, original_cursor).map_err(PlumbingError::from)?;

        let old_paths: HashSet<&[u8]> = old_files.iter().map(|f| f.path.as_slice()).collect();
        let to_add: Vec<FileRecord> = upstream_files
            .iter()
            .filter(|f| self.filter.want(&f.path) && !old_paths.contains(f.path.as_slice()))
            .cloned()
            .collect();

        if to_add.is_empty() {
            return Ok(current.to_string());
        }

        let to_add_paths: Vec<Vec<u8>> = to_add.iter().map(|f| f.path.clone()).collect();
        let restricted_filter = crate::filter::FilterConfig::exact_paths(&to_add_paths)?;

        let options = RewriteOptions {
            window: ADD_WINDOW,
            annotation_key: RECOVERED_FROM_KEY.to_string(),
            ..RewriteOptions::default()
        };

        let mut side_rewriter =
            HistoryRewriter::new(self.runner, &restricted_filter, initial_commit, options)?;
        let side_branch_head = side_rewriter.rewrite(original_cursor, observer)?;

        let side_files =
            plumbing::list_files(self.runner, &side_branch_head).map_err(PlumbingError::from)?;

        let mut tree = crate::lazytree::LazyTree::from_tree(self.runner, &current_meta.tree)
            .map_err(RewriteError::from)?;
        for f in side_files {
            tree.set(f);
        }
        let new_tree = tree.hash().map_err(RewriteError::from)?;

        let expected_files = self.filter.filter_files(&old_files, &upstream_files);
        let expected_tree =
            plumbing::make_tree(self.runner, &expected_files).map_err(PlumbingError::from)?;
        if expected_tree != new_tree {
            return Err(RewriteError::AddPhaseMismatch);
        }

        let message = annotated_message(ADD_MESSAGE, RECOVERED_FROM_KEY, original_cursor);
        let hash = plumbing::commit_tree(
            self.runner,
            &new_tree,
            &[current.to_string(), side_branch_head],
            &driver_identity(),
            &message,
        )
        .map_err(PlumbingError::from)?;
        Ok(hash)
    }

    /// FORWARD: runs the History Rewriter from `current` to `target`.
    pub fn forward(
        &self,
        current: &str,
        target: &str,
        observer: &dyn RewriteObserver,
    ) -> Result<String, RewriteError> {
        let mut rewriter =
            HistoryRewriter::new(self.runner, self.filter, current, RewriteOptions::default())?;
        rewriter.rewrite(target, observer)
    }

    /// Checks that `current`'s tree matches `MakeTree(FilterFiles([],
    /// ListFiles(original_cursor)))`, as required before FORWARD in the
    /// `--all` composition (§4.5).
    pub fn check_consistency(&self, current: &str, original_cursor: &str) -> Result<(), RewriteError> {
        let meta = plumbing::get_metadata(self.runner, current).map_err(PlumbingError::from)?;
        let upstream_files =
            plumbing::list_files(self.runner, original_cursor).map_err(PlumbingError::from)?;
        let expected_files = self.filter.filter_files(&[], &upstream_files);
        let expected_tree =
            plumbing::make_tree(self.runner, &expected_files).map_err(PlumbingError::from)?;
        if expected_tree != meta.tree {
            return Err(RewriteError::ConsistencyMismatch {
                commit: current.to_string(),
            });
        }
        Ok(())
    }

    /// `--all`: DELETE, optional ADD, a consistency check, then FORWARD.
    pub fn run_all(
        &self,
        current: &str,
        target: &str,
        original_cursor: &str,
        add_initial_commit: Option<&str>,
        observer: &dyn RewriteObserver,
    ) -> Result<String, RewriteError> {
        let after_delete = self.delete(current, original_cursor)?;
        let after_add = match add_initial_commit {
            Some(initial) => self.add(&after_delete, original_cursor, initial, observer)?,
            None => after_delete,
        };
        self.check_consistency(&after_add, original_cursor)?;
        self.forward(&after_add, target, observer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_message_carries_original_cursor_annotation() {
        let msg = annotated_message(DELETE_MESSAGE, crate::rewriter::DEFAULT_ANNOTATION_KEY, "deadbeef");
        let text = String::from_utf8(msg).unwrap();
        assert!(text.contains("OriginalCommit: deadbeef"));
    }
}
