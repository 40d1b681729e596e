//! Core library: git plumbing, the path filter, the in-memory lazy tree, the
//! History Rewriter, and the Upstream Branch Driver.

pub mod config;
pub mod driver;
pub mod error;
pub mod filter;
pub mod lazytree;
pub mod plumbing;
pub mod rewriter;

pub use driver::BranchDriver;
pub use error::{FilterError, GitProcessError, PlumbingError, RewriteError};
pub use filter::{FilterConfig, FilterPatterns};
pub use lazytree::LazyTree;
pub use plumbing::GitRunner;
pub use rewriter::{HistoryRewriter, NullObserver, RewriteObserver, RewriteOptions, TracingObserver};
