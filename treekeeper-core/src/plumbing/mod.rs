//! A thin, typed view over the external `git` command-line (§4.1).
//!
//! Every operation here shells out to the `git` binary and parses its
//! stdout into a typed record. No other module in this crate re-parses
//! textual `git` output; this is the only place that does.

mod commit;
mod diff;
mod files;
mod metadata;
mod process;
mod revlist;
mod types;

pub use commit::{commit_tree, make_tree};
pub use diff::{diff_tree, EMPTY_TREE};
pub use files::list_files;
pub use metadata::get_metadata;
pub use process::GitRunner;
pub use revlist::rev_list;
pub use types::{Annotations, CommitMetadata, DiffOp, DiffOpKind, FileRecord, Identity};

/// Sentinel for "no commit" / the empty tree, used wherever the spec allows
/// `a` to be "none" (e.g. `DiffTree(none, b)`, `RevList(none, to)`).
pub const NONE: &str = "none";

pub fn is_none(hash: &str) -> bool {
    hash == NONE
}
