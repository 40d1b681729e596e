use std::collections::BTreeMap;

use crate::error::GitProcessError;

use super::process::GitRunner;
use super::types::{FileRecord, Identity};

/// `MakeTree(files)` (§4.1): deterministic, canonical tree-hash for a flat
/// set of file records. Builds the tree bottom-up, one `git mktree` call per
/// directory level, since `mktree` only constructs a single level at a time.
pub fn make_tree(runner: &GitRunner, files: &[FileRecord]) -> Result<String, GitProcessError> {
    if files.is_empty() {
        return Ok(super::diff::EMPTY_TREE.to_string());
    }
    build_level(runner, files)
}

fn build_level(runner: &GitRunner, files: &[FileRecord]) -> Result<String, GitProcessError> {
    // direct entries at this level, and files grouped by their first path
    // component for recursive subtree construction.
    let mut direct: Vec<&FileRecord> = Vec::new();
    let mut nested: BTreeMap<Vec<u8>, Vec<FileRecord>> = BTreeMap::new();

    for f in files {
        match f.path.iter().position(|&b| b == b'/') {
            None => direct.push(f),
            Some(idx) => {
                let (head, tail) = (&f.path[..idx], &f.path[idx + 1..]);
                nested.entry(head.to_vec()).or_default().push(FileRecord {
                    path: tail.to_vec(),
                    mode: f.mode,
                    blob_hash: f.blob_hash.clone(),
                });
            }
        }
    }

    let mut entries: Vec<(Vec<u8>, u32, String)> = Vec::new();
    for f in direct {
        entries.push((f.path.clone(), f.mode, f.blob_hash.clone()));
    }
    for (name, sub_files) in nested {
        let sub_hash = build_level(runner, &sub_files)?;
        entries.push((name, 0o040000, sub_hash));
    }

    let mut stdin = Vec::new();
    for (name, mode, hash) in &entries {
        let object_type = if *mode == 0o040000 { "tree" } else { "blob" };
        stdin.extend_from_slice(format!("{mode:o} {object_type} {hash}\t").as_bytes());
        stdin.extend_from_slice(name);
        stdin.push(b'\n');
    }

    runner.run_with_stdin(&["mktree"], &stdin)
}

/// `CommitTree(tree, parents, ident, msg)` (§4.1): preserves `msg` bytes
/// exactly; only the author identity is pinned to `ident` — committer name,
/// email, and date are left to git's own defaults.
pub fn commit_tree(
    runner: &GitRunner,
    tree: &str,
    parents: &[String],
    ident: &Identity,
    message: &[u8],
) -> Result<String, GitProcessError> {
    let mut args: Vec<&str> = vec!["commit-tree", tree];
    for p in parents {
        args.push("-p");
        args.push(p);
    }

    let date = format!("{} {}", ident.time, ident.timezone);
    let envs = [
        ("GIT_AUTHOR_NAME", ident.name.as_str()),
        ("GIT_AUTHOR_EMAIL", ident.email.as_str()),
        ("GIT_AUTHOR_DATE", date.as_str()),
    ];

    runner.run_with_stdin_env(&args, message, &envs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_files_by_first_path_component() {
        // This only exercises the grouping logic, not an actual git call;
        // `build_level` is only reachable through `make_tree`, which we
        // cover in the integration test crate against a real repo.
        let files = vec![
            FileRecord::new("a.h", 0o100644, "1".repeat(40)),
            FileRecord::new("base/b.h", 0o100644, "2".repeat(40)),
            FileRecord::new("base/win/c.h", 0o100644, "3".repeat(40)),
        ];
        let mut nested: BTreeMap<Vec<u8>, usize> = BTreeMap::new();
        for f in &files {
            if let Some(idx) = f.path.iter().position(|&b| b == b'/') {
                *nested.entry(f.path[..idx].to_vec()).or_default() += 1;
            }
        }
        assert_eq!(nested.get(b"base".as_slice()), Some(&2));
    }
}
