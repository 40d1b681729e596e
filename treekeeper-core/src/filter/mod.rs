//! Path filter (§4.2): the `want`/`keep` predicates and the two filtering
//! surfaces built on them.

use std::collections::HashSet;

use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::plumbing::{DiffOp, FileRecord};

/// Serializable source for a [`FilterConfig`]: ordered regex patterns as
/// plain strings, as they would be read out of a `[filter]` TOML section
/// (§6.1).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterPatterns {
    #[serde(default)]
    pub want: Vec<String>,
    #[serde(default)]
    pub want_exclude: Vec<String>,
    #[serde(default)]
    pub always_want: Vec<String>,
    #[serde(default)]
    pub keep: Vec<String>,
    #[serde(default)]
    pub keep_exclude: Vec<String>,
}

/// Compiled path filter (§4.2). Each list is a set of regexes anchored at
/// the start of the path (patterns are wrapped in `^(?:...)` at compile
/// time so callers don't have to remember to anchor them themselves).
pub struct FilterConfig {
    want: Vec<Regex>,
    want_exclude: Vec<Regex>,
    always_want: Vec<Regex>,
    keep: Vec<Regex>,
    keep_exclude: Vec<Regex>,
}

fn compile(list: &'static str, patterns: &[String]) -> Result<Vec<Regex>, FilterError> {
    patterns
        .iter()
        .map(|p| {
            let anchored = format!("^(?:{p})");
            Regex::new(&anchored).map_err(|source| FilterError::InvalidPattern {
                list,
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

fn any_match(patterns: &[Regex], path: &[u8]) -> bool {
    patterns.iter().any(|r| r.is_match(path))
}

impl FilterConfig {
    pub fn compile(patterns: &FilterPatterns) -> Result<Self, FilterError> {
        Ok(Self {
            want: compile("WANT", &patterns.want)?,
            want_exclude: compile("WANT_EXCLUDE", &patterns.want_exclude)?,
            always_want: compile("ALWAYS_WANT", &patterns.always_want)?,
            keep: compile("KEEP", &patterns.keep)?,
            keep_exclude: compile("KEEP_EXCLUDE", &patterns.keep_exclude)?,
        })
    }

    /// A restricted filter matching exactly the given paths and nothing
    /// else, used by the Upstream Branch Driver's ADD phase (§4.5) to run
    /// the History Rewriter over only the newly-wanted files.
    pub fn exact_paths(paths: &[Vec<u8>]) -> Result<Self, FilterError> {
        let patterns: Vec<String> = paths
            .iter()
            .map(|p| format!("{}$", regex::escape(&String::from_utf8_lossy(p))))
            .collect();
        Ok(Self {
            want: compile("WANT", &patterns)?,
            want_exclude: Vec::new(),
            always_want: Vec::new(),
            keep: Vec::new(),
            keep_exclude: Vec::new(),
        })
    }

    /// `want(path)` (§4.2): WANT, minus WANT_EXCLUDE, with ALWAYS_WANT
    /// re-overriding WANT_EXCLUDE back to true. ALWAYS_WANT never overrides
    /// a path that failed WANT in the first place.
    pub fn want(&self, path: &[u8]) -> bool {
        let mut wanted = any_match(&self.want, path);
        if wanted && any_match(&self.want_exclude, path) {
            wanted = any_match(&self.always_want, path);
        }
        wanted
    }

    /// `keep(path)` (§4.2): the analogous KEEP ∖ KEEP_EXCLUDE computation.
    pub fn keep(&self, path: &[u8]) -> bool {
        let mut kept = any_match(&self.keep, path);
        if kept && any_match(&self.keep_exclude, path) {
            kept = false;
        }
        kept
    }

    /// `FilterFiles(downstream_files, upstream_files)` (§4.2).
    pub fn filter_files(
        &self,
        downstream_files: &[FileRecord],
        upstream_files: &[FileRecord],
    ) -> Vec<FileRecord> {
        let mut seen: HashSet<Vec<u8>> = HashSet::new();
        let mut out = Vec::new();
        for f in upstream_files {
            if self.want(&f.path) {
                seen.insert(f.path.clone());
                out.push(f.clone());
            }
        }
        for f in downstream_files {
            if self.keep(&f.path) && !seen.contains(&f.path) {
                out.push(f.clone());
            }
        }
        out.sort_by(|a, b| a.path.cmp(&b.path));
        out
    }

    /// `FilterDiff(diff)` (§4.2): keep each operation whose path satisfies
    /// `want`. For a kept change, `keep(path)` must be false — `want` and
    /// `keep` are asserted disjoint on every surviving path.
    pub fn filter_diff(&self, diff: &[DiffOp]) -> Result<Vec<DiffOp>, FilterError> {
        let mut out = Vec::with_capacity(diff.len());
        for op in diff {
            if self.want(op.path()) {
                if self.keep(op.path()) {
                    return Err(FilterError::WantKeepOverlap {
                        path: op.file.path_str().into_owned(),
                    });
                }
                out.push(op.clone());
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plumbing::DiffOpKind;

    fn cfg(want: &[&str], want_exclude: &[&str], always_want: &[&str], keep: &[&str]) -> FilterConfig {
        FilterConfig::compile(&FilterPatterns {
            want: want.iter().map(|s| s.to_string()).collect(),
            want_exclude: want_exclude.iter().map(|s| s.to_string()).collect(),
            always_want: always_want.iter().map(|s| s.to_string()).collect(),
            keep: keep.iter().map(|s| s.to_string()).collect(),
            keep_exclude: vec![],
        })
        .unwrap()
    }

    #[test]
    fn want_excludes_then_always_want_overrides() {
        let f = cfg(&["base/.*"], &["base/win/.*"], &["base/win/allow.h"], &[]);
        assert!(f.want(b"base/a.h"));
        assert!(!f.want(b"base/win/b.h"));
        assert!(f.want(b"base/win/allow.h"));
        assert!(!f.want(b"third_party/x.h"));
    }

    #[test]
    fn always_want_does_not_rescue_paths_outside_want() {
        let f = cfg(&["base/.*"], &[], &["third_party/x.h"], &[]);
        assert!(!f.want(b"third_party/x.h"));
    }

    #[test]
    fn filter_files_unions_upstream_want_and_downstream_keep() {
        let f = cfg(&["base/.*"], &[], &[], &["OWNERS"]);
        let up = vec![
            FileRecord::new("base/a.h", 0o100644, "1".repeat(40)),
            FileRecord::new("unwanted.txt", 0o100644, "2".repeat(40)),
        ];
        let down = vec![FileRecord::new("OWNERS", 0o100644, "3".repeat(40))];
        let out = f.filter_files(&down, &up);
        assert_eq!(out.len(), 2);
        assert!(out.iter().any(|r| r.path == b"base/a.h"));
        assert!(out.iter().any(|r| r.path == b"OWNERS"));
    }

    #[test]
    fn filter_diff_drops_unwanted_ops() {
        let f = cfg(&["base/.*"], &[], &[], &[]);
        let diff = vec![
            DiffOp {
                kind: DiffOpKind::Add,
                file: FileRecord::new("base/a.h", 0o100644, "1".repeat(40)),
            },
            DiffOp {
                kind: DiffOpKind::Add,
                file: FileRecord::new("base/win/b.h", 0o100644, "2".repeat(40)),
            },
        ];
        let out = f.filter_diff(&diff).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].file.path, b"base/a.h");
    }

    #[test]
    fn filter_diff_rejects_want_keep_overlap() {
        let f = cfg(&["OWNERS"], &[], &[], &["OWNERS"]);
        let diff = vec![DiffOp {
            kind: DiffOpKind::Add,
            file: FileRecord::new("OWNERS", 0o100644, "1".repeat(40)),
        }];
        assert!(f.filter_diff(&diff).is_err());
    }
}
