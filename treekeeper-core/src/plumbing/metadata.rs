use once_cell::sync::Lazy;

use crate::error::GitProcessError;

use super::process::GitRunner;
use super::types::{parse_annotations, CommitMetadata, Identity};

static AUTHOR_LINE_RE: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"^author (.*) <(.*)> (-?\d+) ([+-]\d{4})$").unwrap());

/// `GetMetadata(hash)` (§4.1): parents, tree, author identity, authored
/// timestamp, and message, with annotations extracted from the message's
/// trailer (§3).
pub fn get_metadata(runner: &GitRunner, hash: &str) -> Result<CommitMetadata, GitProcessError> {
    let raw = runner.run_raw(&["cat-file", "-p", hash])?;
    let (header, message) = split_header_body(&raw).ok_or_else(|| GitProcessError::ParseFailure {
        args: "cat-file -p".to_string(),
        what: "commit object header/body separator",
        detail: hash.to_string(),
    })?;

    let header_str = std::str::from_utf8(header).map_err(|e| GitProcessError::ParseFailure {
        args: "cat-file -p".to_string(),
        what: "commit header",
        detail: e.to_string(),
    })?;

    let mut tree = None;
    let mut parents = Vec::new();
    let mut author = None;

    for line in header_str.lines() {
        if let Some(rest) = line.strip_prefix("tree ") {
            tree = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix("parent ") {
            parents.push(rest.to_string());
        } else if line.starts_with("author ") {
            let caps = AUTHOR_LINE_RE.captures(line).ok_or_else(|| GitProcessError::ParseFailure {
                args: "cat-file -p".to_string(),
                what: "author line",
                detail: line.to_string(),
            })?;
            author = Some(Identity {
                name: caps[1].to_string(),
                email: caps[2].to_string(),
                time: caps[3].parse().map_err(|_| GitProcessError::ParseFailure {
                    args: "cat-file -p".to_string(),
                    what: "author timestamp",
                    detail: line.to_string(),
                })?,
                timezone: caps[4].to_string(),
            });
        }
    }

    let tree = tree.ok_or_else(|| GitProcessError::ParseFailure {
        args: "cat-file -p".to_string(),
        what: "commit tree header",
        detail: hash.to_string(),
    })?;
    let author = author.ok_or_else(|| GitProcessError::ParseFailure {
        args: "cat-file -p".to_string(),
        what: "commit author header",
        detail: hash.to_string(),
    })?;

    let annotations = parse_annotations(message);

    Ok(CommitMetadata {
        hash: hash.to_string(),
        tree,
        parents,
        author,
        message: message.to_vec(),
        annotations,
    })
}

/// Splits a raw `cat-file -p <commit>` blob into `(header, message)` at the
/// first blank line. Continuation header lines (e.g. a multi-line `gpgsig`)
/// start with a literal space and are never empty, so the first empty line
/// unambiguously marks the header/body boundary.
fn split_header_body(raw: &[u8]) -> Option<(&[u8], &[u8])> {
    let pos = raw.windows(2).position(|w| w == b"\n\n")?;
    Some((&raw[..pos], &raw[pos + 2..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_header_and_body() {
        let raw = b"tree abc\nparent def\nauthor A <a@b.com> 100 +0000\ncommitter A <a@b.com> 100 +0000\n\nSubject\n\nOriginalCommit: def\n";
        let (header, body) = split_header_body(raw).unwrap();
        assert!(std::str::from_utf8(header).unwrap().contains("tree abc"));
        assert_eq!(body, b"Subject\n\nOriginalCommit: def\n");
    }
}
