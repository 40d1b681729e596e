use std::collections::HashMap;

/// Sentinel key for the synthetic empty-tree commit used as the ultimate
/// ancestor fallback (§3).
pub const ROOT: &str = "ROOT";

/// Association from upstream commit hash to its filtered counterpart (§3).
/// Invariant: every value is reachable from the filtered branch head.
#[derive(Debug, Default, Clone)]
pub struct CommitsMap {
    inner: HashMap<String, String>,
}

impl CommitsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, orig: &str) -> Option<&str> {
        self.inner.get(orig).map(String::as_str)
    }

    pub fn insert(&mut self, orig: impl Into<String>, filtered: impl Into<String>) {
        self.inner.insert(orig.into(), filtered.into());
    }

    pub fn contains(&self, orig: &str) -> bool {
        self.inner.contains_key(orig)
    }

    pub fn root(&self) -> Option<&str> {
        self.get(ROOT)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
