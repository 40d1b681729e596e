use crate::error::GitProcessError;

use super::process::GitRunner;
use super::types::FileRecord;

/// `ListFiles(commit)` (§4.1): every blob reachable from `commit`'s tree,
/// ordered by path.
pub fn list_files(runner: &GitRunner, commit: &str) -> Result<Vec<FileRecord>, GitProcessError> {
    let raw = runner.run_raw(&["ls-tree", "-r", "-z", commit])?;
    let mut out = parse_ls_tree(&raw, "ls-tree")?;
    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}

fn parse_ls_tree(raw: &[u8], argv_label: &'static str) -> Result<Vec<FileRecord>, GitProcessError> {
    let mut out = Vec::new();
    for record in raw.split(|&b| b == 0) {
        if record.is_empty() {
            continue;
        }
        // "<mode> <type> <hash>\t<path>"
        let tab = record
            .iter()
            .position(|&b| b == b'\t')
            .ok_or_else(|| GitProcessError::ParseFailure {
                args: argv_label.to_string(),
                what: "ls-tree entry",
                detail: String::from_utf8_lossy(record).into_owned(),
            })?;
        let (meta, path) = record.split_at(tab);
        let path = &path[1..];
        let meta_str = std::str::from_utf8(meta).map_err(|e| GitProcessError::ParseFailure {
            args: argv_label.to_string(),
            what: "ls-tree metadata",
            detail: e.to_string(),
        })?;
        let mut fields = meta_str.split(' ');
        let mode = fields.next().ok_or_else(|| GitProcessError::ParseFailure {
            args: argv_label.to_string(),
            what: "ls-tree mode",
            detail: meta_str.to_string(),
        })?;
        let object_type = fields.next().unwrap_or("");
        let hash = fields.next().ok_or_else(|| GitProcessError::ParseFailure {
            args: argv_label.to_string(),
            what: "ls-tree hash",
            detail: meta_str.to_string(),
        })?;
        if object_type != "blob" {
            // Submodules (commit) and nested trees never appear in `-r`
            // output except as blobs; skip anything else defensively.
            continue;
        }
        let mode = u32::from_str_radix(mode, 8).map_err(|e| GitProcessError::ParseFailure {
            args: argv_label.to_string(),
            what: "ls-tree octal mode",
            detail: e.to_string(),
        })?;
        out.push(FileRecord::new(path.to_vec(), mode, hash));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nul_separated_entries() {
        let raw = b"100644 blob aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\tbase/a.h\x00100755 blob bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb\tbase/bin.sh\x00";
        let files = parse_ls_tree(raw, "ls-tree").unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, b"base/a.h");
        assert_eq!(files[0].mode, 0o100644);
        assert_eq!(files[1].mode, 0o100755);
    }
}
