use std::collections::BTreeMap;

/// `(path, mode, blob-hash)` — immutable, structural equality (§3).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileRecord {
    pub path: Vec<u8>,
    pub mode: u32,
    pub blob_hash: String,
}

impl FileRecord {
    pub fn new(path: impl Into<Vec<u8>>, mode: u32, blob_hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode,
            blob_hash: blob_hash.into(),
        }
    }

    pub fn path_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOpKind {
    Add,
    Replace,
    Delete,
}

/// One entry of `DiffTree` (§4.1): `file` is the *target* record for
/// Add/Replace and the *source* record for Delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOp {
    pub kind: DiffOpKind,
    pub file: FileRecord,
}

impl DiffOp {
    pub fn path(&self) -> &[u8] {
        &self.file.path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
    /// Unix seconds.
    pub time: i64,
    /// e.g. "-0700".
    pub timezone: String,
}

/// Annotations are multi-valued; keys are case-sensitive (§3).
pub type Annotations = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMetadata {
    pub hash: String,
    pub tree: String,
    pub parents: Vec<String>,
    pub author: Identity,
    /// Full message bytes, including trailing annotation lines.
    pub message: Vec<u8>,
    pub annotations: Annotations,
}

impl CommitMetadata {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key)?.first().map(String::as_str)
    }
}

/// Parse trailing `KEY: VALUE` lines off a commit message (§6: commit-message
/// annotation format). Parsing is line-based; non-matching trailing lines
/// stop the scan (annotations must be contiguous at the very end).
pub fn parse_annotations(message: &[u8]) -> Annotations {
    static ANNOTATION_RE: once_cell::sync::Lazy<regex::bytes::Regex> =
        once_cell::sync::Lazy::new(|| {
            regex::bytes::Regex::new(r"^([A-Za-z][A-Za-z0-9-]*): (.*)$").unwrap()
        });

    let text_lines: Vec<&[u8]> = message.split(|&b| b == b'\n').collect();
    let mut trailer_start = text_lines.len();
    for (idx, line) in text_lines.iter().enumerate().rev() {
        if line.is_empty() {
            // A single blank line is allowed to separate the trailer block
            // from the body; stop at the first blank line we hit while
            // walking backwards through annotation-shaped lines.
            if trailer_start == idx + 1 {
                trailer_start = idx;
            }
            continue;
        }
        if ANNOTATION_RE.is_match(line) {
            trailer_start = idx;
            continue;
        }
        break;
    }

    let mut out: Annotations = Annotations::new();
    for line in &text_lines[trailer_start..] {
        if let Some(caps) = ANNOTATION_RE.captures(line) {
            let key = String::from_utf8_lossy(&caps[1]).into_owned();
            let value = String::from_utf8_lossy(&caps[2]).into_owned();
            out.entry(key).or_default().push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_annotation() {
        let msg = b"Fix the thing\n\nOriginalCommit: deadbeef\n";
        let ann = parse_annotations(msg);
        assert_eq!(ann.get("OriginalCommit").unwrap(), &vec!["deadbeef".to_string()]);
    }

    #[test]
    fn parses_multi_valued_annotation() {
        let msg = b"Body\n\nReviewed-by: a\nReviewed-by: b\n";
        let ann = parse_annotations(msg);
        assert_eq!(
            ann.get("Reviewed-by").unwrap(),
            &vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn no_trailer_yields_empty() {
        let msg = b"Just a subject line with no trailer";
        assert!(parse_annotations(msg).is_empty());
    }

    #[test]
    fn is_merge_checks_parent_count() {
        let meta = CommitMetadata {
            hash: "a".into(),
            tree: "t".into(),
            parents: vec!["p1".into(), "p2".into()],
            author: Identity {
                name: "n".into(),
                email: "e".into(),
                time: 0,
                timezone: "+0000".into(),
            },
            message: vec![],
            annotations: Annotations::new(),
        };
        assert!(meta.is_merge());
    }
}
