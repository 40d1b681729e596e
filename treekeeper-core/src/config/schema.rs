use std::collections::BTreeMap;

use serde::Deserialize;

use crate::rewriter::DEFAULT_ANNOTATION_KEY;

/// Raw `[filter]` table as read from a TOML config file (§6.1). Each list
/// is additive across layers; compiling happens once, after all layers are
/// merged, in [`crate::filter::FilterConfig::compile`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterPatternsLayer {
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

/// Raw `[boards]` table: board-group token (`"all"`, `"default"`, or a
/// literal board name) to the concrete board identifiers it expands to.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardsLayer {
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
}

/// Raw `[run]` table: concurrency caps and run-wide toggles (§5).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunSettingsLayer {
    pub verbose: Option<bool>,
    pub quiet: Option<bool>,
    pub dry_run: Option<bool>,
    pub k_setup: Option<usize>,
    pub k_build: Option<usize>,
    pub k_emerge: Option<usize>,
    pub annotation_key: Option<String>,
}

/// The full shape of an on-disk TOML config file: `[filter]`, `[boards]`,
/// `[run]`, each optional and defaulting to empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub filter: FilterPatternsLayer,
    #[serde(default)]
    pub boards: BoardsLayer,
    #[serde(default)]
    pub run: RunSettingsLayer,
}

/// Resolved board-group mapping (§3.1). A token with no registered group
/// resolves to itself, so an un-grouped literal board name still works.
#[derive(Debug, Clone, Default)]
pub struct BoardsConfig {
    groups: BTreeMap<String, Vec<String>>,
}

impl BoardsConfig {
    pub fn resolve(&self, token: &str) -> Vec<String> {
        match self.groups.get(token) {
            Some(boards) => boards.clone(),
            None => vec![token.to_string()],
        }
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<String>> {
        &self.groups
    }
}

/// The merged, validated view CLI flags turn into (§3.1): verbosity,
/// dry-run, concurrency caps, and the annotation key name override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub verbose: bool,
    pub quiet: bool,
    pub dry_run: bool,
    pub k_setup: usize,
    pub k_build: usize,
    pub k_emerge: usize,
    pub annotation_key: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            verbose: false,
            quiet: false,
            dry_run: false,
            k_setup: 1,
            k_build: 3,
            k_emerge: 50,
            annotation_key: DEFAULT_ANNOTATION_KEY.to_string(),
        }
    }
}
