use thiserror::Error;

/// A `git` subprocess that exited non-zero, or failed to spawn at all.
#[derive(Debug, Error)]
pub enum GitProcessError {
    #[error("failed to spawn `git {args}`: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`git {args}` exited with {status}: {stderr}")]
    NonZeroExit {
        args: String,
        status: String,
        stderr: String,
    },
    #[error("`git {args}` produced output that could not be parsed as {what}: {detail}")]
    ParseFailure {
        args: String,
        what: &'static str,
        detail: String,
    },
}

/// Errors raised by the git plumbing layer (§4.1).
#[derive(Debug, Error)]
pub enum PlumbingError {
    #[error(transparent)]
    Git(#[from] GitProcessError),
}

/// Errors raised while constructing or validating a [`crate::filter::FilterConfig`].
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid regex in {list} list, pattern {pattern:?}: {source}")]
    InvalidPattern {
        list: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error(
        "path {path:?} satisfies both `want` and `keep` at once; WANT and KEEP must stay disjoint"
    )]
    WantKeepOverlap { path: String },
}

/// Fatal errors from the History Rewriter (§4.4) and Upstream Branch Driver (§4.5).
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Plumbing(#[from] PlumbingError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(
        "integrity check failed for upstream commit {upstream}: expected tree {expected_tree}, got {actual_tree}"
    )]
    IntegrityMismatch {
        upstream: String,
        expected_tree: String,
        actual_tree: String,
    },

    #[error("commit {commit} has no entry in the commits map and no ROOT fallback is available")]
    MissingAncestor { commit: String },

    #[error("ADD phase produced a tree that does not match the expected filtered result")]
    AddPhaseMismatch,

    #[error("filtered branch head {commit} is not consistent with the current filters")]
    ConsistencyMismatch { commit: String },
}

pub type Result<T, E = RewriteError> = std::result::Result<T, E>;
