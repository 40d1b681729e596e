use crate::error::GitProcessError;

use super::process::GitRunner;
use super::types::{DiffOp, DiffOpKind, FileRecord};

/// The well-known hash of the empty tree, used whenever `a` is `"none"`.
pub const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// `DiffTree(a, b)` (§4.1): the symmetric difference between two trees as a
/// sequence of `(op, file)`. `a == "none"` means "diff against the empty tree".
pub fn diff_tree(runner: &GitRunner, a: &str, b: &str) -> Result<Vec<DiffOp>, GitProcessError> {
    let from = if super::is_none(a) { EMPTY_TREE } else { a };
    let raw = runner.run_raw(&["diff-tree", "-r", "-z", "--no-renames", from, b])?;
    parse_diff_tree(&raw)
}

fn parse_diff_tree(raw: &[u8]) -> Result<Vec<DiffOp>, GitProcessError> {
    // Each record is ":<old_mode> <new_mode> <old_hash> <new_hash> <status>"
    // followed by a NUL, then "<path>" followed by a NUL.
    let mut out = Vec::new();
    let mut fields: Vec<&[u8]> = raw.split(|&b| b == 0).collect();
    if fields.last().map(|s| s.is_empty()).unwrap_or(false) {
        fields.pop();
    }
    let mut iter = fields.into_iter();
    while let Some(meta) = iter.next() {
        if meta.is_empty() {
            continue;
        }
        let path = iter.next().ok_or_else(|| GitProcessError::ParseFailure {
            args: "diff-tree".to_string(),
            what: "diff-tree path",
            detail: "metadata record with no following path".to_string(),
        })?;
        let meta_str = std::str::from_utf8(meta).map_err(|e| GitProcessError::ParseFailure {
            args: "diff-tree".to_string(),
            what: "diff-tree metadata",
            detail: e.to_string(),
        })?;
        let meta_str = meta_str.strip_prefix(':').unwrap_or(meta_str);
        let mut parts = meta_str.split(' ');
        let old_mode = parts.next().unwrap_or("");
        let new_mode = parts.next().unwrap_or("");
        let old_hash = parts.next().unwrap_or("");
        let new_hash = parts.next().unwrap_or("");
        let status = parts.next().unwrap_or("");
        let status_char = status.chars().next().unwrap_or('\0');

        let (kind, mode_str, hash) = match status_char {
            'A' => (DiffOpKind::Add, new_mode, new_hash),
            'D' => (DiffOpKind::Delete, old_mode, old_hash),
            // Modified, type-changed, or anything else git reports as a
            // straight content change maps to Replace.
            _ => (DiffOpKind::Replace, new_mode, new_hash),
        };

        let mode = u32::from_str_radix(mode_str, 8).map_err(|e| GitProcessError::ParseFailure {
            args: "diff-tree".to_string(),
            what: "diff-tree octal mode",
            detail: e.to_string(),
        })?;

        out.push(DiffOp {
            kind,
            file: FileRecord::new(path.to_vec(), mode, hash),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_replace_delete() {
        let h1 = "a".repeat(40);
        let h2 = "b".repeat(40);
        let raw = format!(
            ":000000 100644 {z} {h1} A\0base/new.h\0:100644 100644 {h1} {h2} M\0base/changed.h\0:100644 000000 {h1} {z} D\0base/removed.h\0",
            z = "0".repeat(40),
            h1 = h1,
            h2 = h2,
        );
        let ops = parse_diff_tree(raw.as_bytes()).unwrap();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0].kind, DiffOpKind::Add);
        assert_eq!(ops[0].file.path, b"base/new.h");
        assert_eq!(ops[1].kind, DiffOpKind::Replace);
        assert_eq!(ops[2].kind, DiffOpKind::Delete);
        assert_eq!(ops[2].file.blob_hash, h1);
    }
}
