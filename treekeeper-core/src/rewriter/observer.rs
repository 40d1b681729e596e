use crate::plumbing::CommitMetadata;

/// Structured progress observer for the History Rewriter (§9: "callback-
/// driven progress → structured observer"). Implementations may ignore
/// either hook; a no-op default is provided for tests.
pub trait RewriteObserver {
    /// Called before processing upstream commit `upstream_hashes[index]`.
    fn on_commit_progress(&self, index: usize, total: usize, upstream_hash: &str, meta: &CommitMetadata) {
        let _ = (index, total, upstream_hash, meta);
    }

    /// Called after a filtered commit is emitted. Not called for elided
    /// (diff-empty fast-path or look-forward-compressed) commits.
    fn on_commit_emitted(&self, upstream_hash: &str, new_hash: &str, meta: &CommitMetadata) {
        let _ = (upstream_hash, new_hash, meta);
    }
}

/// Default observer used by unit tests and anywhere progress reporting is
/// not wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RewriteObserver for NullObserver {}

/// Observer used by the CLI binaries: emits a `tracing` span per hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RewriteObserver for TracingObserver {
    fn on_commit_progress(&self, index: usize, total: usize, upstream_hash: &str, _meta: &CommitMetadata) {
        tracing::info!(
            index,
            total,
            upstream_hash,
            "processing upstream commit"
        );
    }

    fn on_commit_emitted(&self, upstream_hash: &str, new_hash: &str, _meta: &CommitMetadata) {
        tracing::info!(upstream_hash, new_hash, "emitted filtered commit");
    }
}
