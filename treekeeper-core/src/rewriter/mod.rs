//! History Rewriter (§4.4): walks the upstream rev-list and emits new
//! commits on the filtered branch, commit-for-commit, preserving author
//! identity, authored timestamp, and the parent DAG.

mod commits_map;
mod observer;

pub use commits_map::CommitsMap;
pub use observer::{NullObserver, RewriteObserver, TracingObserver};

use crate::error::RewriteError;
use crate::filter::FilterConfig;
use crate::plumbing::{self, CommitMetadata, FileRecord, GitRunner, Identity};

/// Default annotation key recording the upstream hash a filtered commit was
/// derived from (§3).
pub const DEFAULT_ANNOTATION_KEY: &str = "OriginalCommit";

/// Well-known message for the synthetic ROOT commit (§4.4 step 3).
const ROOT_MESSAGE: &str = "Initial filtered commit";

/// How often (in emitted-or-processed commits) to run the integrity check,
/// beyond "every merge" and "the final commit" (§4.4).
pub const DEFAULT_VERIFY_EVERY: u64 = 1000;

#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// Look-forward compression window; 0 disables it (§4.4).
    pub window: usize,
    /// Overrides [`DEFAULT_ANNOTATION_KEY`].
    pub annotation_key: String,
    pub verify_every: u64,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            window: 0,
            annotation_key: DEFAULT_ANNOTATION_KEY.to_string(),
            verify_every: DEFAULT_VERIFY_EVERY,
        }
    }
}

pub struct HistoryRewriter<'a> {
    runner: &'a GitRunner,
    filter: &'a FilterConfig,
    options: RewriteOptions,
    commits_map: CommitsMap,
    /// The upstream hash the filtered branch is currently pinned at
    /// (`U` in §4.4), or `None` if the branch carries no anchor yet.
    anchor: Option<String>,
}

impl<'a> HistoryRewriter<'a> {
    /// Initializes from an existing filtered branch head, per §4.4's
    /// "Initialization" steps 1-4.
    pub fn new(
        runner: &'a GitRunner,
        filter: &'a FilterConfig,
        parent_filtered: &str,
        options: RewriteOptions,
    ) -> Result<Self, RewriteError> {
        let mut commits_map = CommitsMap::new();
        let mut last_known_anchor: Option<String> = None;
        let mut newest_unanchored: Option<String> = None;

        // Step 1 + step 4 prep: walk first parents looking for the nearest
        // ancestor carrying the annotation.
        let mut cursor = parent_filtered.to_string();
        loop {
            let meta = plumbing::get_metadata(runner, &cursor).map_err(crate::error::PlumbingError::from)?;
            if let Some(orig) = meta.annotation(&options.annotation_key) {
                last_known_anchor = Some(orig.to_string());
                break;
            }
            newest_unanchored = Some(cursor.clone());
            match meta.first_parent() {
                Some(p) => cursor = p.to_string(),
                None => break,
            }
        }

        // Step 2: scan the entire filtered branch, reading every annotation.
        let all_filtered = plumbing::rev_list(runner, plumbing::NONE, parent_filtered)
            .map_err(crate::error::PlumbingError::from)?;
        for filtered_hash in &all_filtered {
            let meta = plumbing::get_metadata(runner, filtered_hash).map_err(crate::error::PlumbingError::from)?;
            if let Some(orig) = meta.annotation(&options.annotation_key) {
                commits_map.insert(orig.to_string(), filtered_hash.clone());
            }
        }

        // Step 3: synthesize ROOT if absent.
        if commits_map.root().is_none() {
            let empty_tree = plumbing::diff::EMPTY_TREE.to_string();
            let root_ident = Identity {
                name: "treekeeper".to_string(),
                email: "treekeeper@localhost".to_string(),
                time: 0,
                timezone: "+0000".to_string(),
            };
            let root_hash = plumbing::commit_tree(
                runner,
                &empty_tree,
                &[parent_filtered.to_string()],
                &root_ident,
                ROOT_MESSAGE.as_bytes(),
            )
            .map_err(crate::error::PlumbingError::from)?;
            commits_map.insert(commits_map::ROOT, root_hash);
        }

        // Step 4: if the branch advanced past the last-known anchor with
        // unannotated commits on top, re-point so new commits stack there.
        if let (Some(anchor), Some(_)) = (&last_known_anchor, &newest_unanchored) {
            commits_map.insert(anchor.clone(), parent_filtered.to_string());
        }

        Ok(Self {
            runner,
            filter,
            options,
            commits_map,
            anchor: last_known_anchor,
        })
    }

    pub fn commits_map(&self) -> &CommitsMap {
        &self.commits_map
    }

    /// Resolves an upstream hash to its filtered counterpart: itself if
    /// mapped, else the least ancestor (by first-parent climb) that is
    /// mapped, ultimately ROOT (§4.4).
    fn find(&self, orig: &str) -> Result<String, RewriteError> {
        if plumbing::is_none(orig) {
            return self
                .commits_map
                .root()
                .map(str::to_string)
                .ok_or_else(|| RewriteError::MissingAncestor {
                    commit: commits_map::ROOT.to_string(),
                });
        }
        if let Some(v) = self.commits_map.get(orig) {
            return Ok(v.to_string());
        }
        let mut cursor = orig.to_string();
        loop {
            let meta = plumbing::get_metadata(self.runner, &cursor).map_err(crate::error::PlumbingError::from)?;
            let parent = meta.first_parent().map(str::to_string);
            match parent {
                None => {
                    return self
                        .commits_map
                        .root()
                        .map(str::to_string)
                        .ok_or_else(|| RewriteError::MissingAncestor {
                            commit: commits_map::ROOT.to_string(),
                        });
                }
                Some(p) => {
                    if let Some(v) = self.commits_map.get(&p) {
                        return Ok(v.to_string());
                    }
                    cursor = p;
                }
            }
        }
    }

    fn tree_of_filtered(&self, filtered_hash: &str) -> Result<String, RewriteError> {
        let meta = plumbing::get_metadata(self.runner, filtered_hash).map_err(crate::error::PlumbingError::from)?;
        Ok(meta.tree)
    }

    /// Runs the History Rewriter from the current head to `goal_browser`,
    /// returning the new filtered-branch head (§4.4).
    pub fn rewrite(
        &mut self,
        goal_browser: &str,
        observer: &dyn RewriteObserver,
    ) -> Result<String, RewriteError> {
        let anchor = self.anchor.clone().unwrap_or_else(|| plumbing::NONE.to_string());
        let revs = plumbing::rev_list(self.runner, &anchor, goal_browser)
            .map_err(crate::error::PlumbingError::from)?;

        if revs.is_empty() {
            return self.find(&anchor);
        }

        let total = revs.len();
        let mut lookforward_disabled_until = 0usize;
        let mut i = 0usize;
        let mut processed_since_verify: u64 = 0;

        while i < revs.len() {
            let hash = revs[i].clone();
            let meta = plumbing::get_metadata(self.runner, &hash).map_err(crate::error::PlumbingError::from)?;
            observer.on_commit_progress(i, total, &hash, &meta);

            if self.options.window > 0
                && i >= lookforward_disabled_until
                && i + self.options.window <= revs.len()
            {
                if self.try_elide_window(&revs, i, &meta)? {
                    i += self.options.window;
                    continue;
                }
                lookforward_disabled_until = i + self.options.window;
            }

            let is_final = i + 1 == revs.len();
            processed_since_verify += 1;
            let should_verify_count = processed_since_verify >= self.options.verify_every;
            if should_verify_count {
                processed_since_verify = 0;
            }

            self.process_single(&hash, &meta, is_final || should_verify_count, observer)?;
            i += 1;
        }

        self.find(goal_browser)
    }

    /// Attempts the look-forward elision described in §4.4: if the combined
    /// filtered diff across `[i..i+window)` is empty and the window
    /// contains no merges, map every commit in the window to
    /// `commits_map[P]` and report success.
    fn try_elide_window(
        &mut self,
        revs: &[String],
        i: usize,
        meta_i: &CommitMetadata,
    ) -> Result<bool, RewriteError> {
        let window = self.options.window;
        let last = &revs[i + window - 1];
        let p = meta_i.first_parent().map(str::to_string).unwrap_or_else(|| plumbing::NONE.to_string());

        let mut has_merge = meta_i.is_merge();
        if !has_merge {
            for h in &revs[i + 1..i + window] {
                let m = plumbing::get_metadata(self.runner, h).map_err(crate::error::PlumbingError::from)?;
                if m.is_merge() {
                    has_merge = true;
                    break;
                }
            }
        }
        if has_merge {
            return Ok(false);
        }

        let combined_diff = plumbing::diff_tree(self.runner, last, &revs[i]).map_err(crate::error::PlumbingError::from)?;
        let filtered = self.filter.filter_diff(&combined_diff)?;
        if !filtered.is_empty() {
            return Ok(false);
        }

        let mapped = self.find(&p)?;
        for h in &revs[i..i + window] {
            self.commits_map.insert(h.clone(), mapped.clone());
        }
        Ok(true)
    }

    fn process_single(
        &mut self,
        hash: &str,
        meta: &CommitMetadata,
        force_verify: bool,
        observer: &dyn RewriteObserver,
    ) -> Result<(), RewriteError> {
        let p = meta.first_parent().map(str::to_string).unwrap_or_else(|| plumbing::NONE.to_string());

        if !meta.is_merge() {
            let diff = plumbing::diff_tree(self.runner, &p, hash).map_err(crate::error::PlumbingError::from)?;
            let filtered = self.filter.filter_diff(&diff)?;
            if filtered.is_empty() {
                let mapped = self.find(&p)?;
                self.commits_map.insert(hash.to_string(), mapped);
                return Ok(());
            }
            self.emit_commit(hash, meta, &p, filtered, force_verify, observer)
        } else {
            // Merges are always emitted, even if the filtered diff versus
            // the first parent is empty (§4.4).
            let diff = plumbing::diff_tree(self.runner, &p, hash).map_err(crate::error::PlumbingError::from)?;
            let filtered = self.filter.filter_diff(&diff)?;
            self.emit_commit(hash, meta, &p, filtered, true, observer)
        }
    }

    fn emit_commit(
        &mut self,
        hash: &str,
        meta: &CommitMetadata,
        first_parent_orig: &str,
        filtered_diff: Vec<plumbing::DiffOp>,
        force_verify: bool,
        observer: &dyn RewriteObserver,
    ) -> Result<(), RewriteError> {
        let base_filtered = self.find(first_parent_orig)?;
        let base_tree = self.tree_of_filtered(&base_filtered)?;

        let mut tree = crate::lazytree::LazyTree::from_tree(self.runner, &base_tree)
            .map_err(RewriteError::from)?;
        for op in &filtered_diff {
            match op.kind {
                plumbing::DiffOpKind::Add | plumbing::DiffOpKind::Replace => tree.set(op.file.clone()),
                plumbing::DiffOpKind::Delete => tree.delete(op.path()),
            }
        }
        let new_tree = tree.hash().map_err(RewriteError::from)?;

        let mapped_parents: Vec<String> = meta
            .parents
            .iter()
            .map(|p| self.find(p))
            .collect::<Result<_, _>>()?;

        let mut message = meta.message.clone();
        if !message.ends_with(b"\n") {
            message.push(b'\n');
        }
        message.extend_from_slice(b"\n");
        message.extend_from_slice(self.options.annotation_key.as_bytes());
        message.extend_from_slice(b": ");
        message.extend_from_slice(hash.as_bytes());
        message.push(b'\n');

        let new_hash = plumbing::commit_tree(self.runner, &new_tree, &mapped_parents, &meta.author, &message)
            .map_err(crate::error::PlumbingError::from)?;

        if meta.is_merge() || force_verify {
            self.verify_integrity(hash, &new_tree)?;
        }

        self.commits_map.insert(hash.to_string(), new_hash.clone());
        observer.on_commit_emitted(hash, &new_hash, meta);
        Ok(())
    }

    /// Integrity verification (§4.4): recompute the filtered tree from
    /// scratch and compare against the incrementally produced one.
    fn verify_integrity(&self, upstream_hash: &str, actual_tree: &str) -> Result<(), RewriteError> {
        let upstream_files = plumbing::list_files(self.runner, upstream_hash).map_err(crate::error::PlumbingError::from)?;
        let filtered_files: Vec<FileRecord> = self.filter.filter_files(&[], &upstream_files);
        let expected_tree = plumbing::make_tree(self.runner, &filtered_files).map_err(crate::error::PlumbingError::from)?;
        if expected_tree != actual_tree {
            return Err(RewriteError::IntegrityMismatch {
                upstream: upstream_hash.to_string(),
                expected_tree,
                actual_tree: actual_tree.to_string(),
            });
        }
        Ok(())
    }
}
