use crate::filter::FilterPatterns;

/// `defaults()`, step one of the layering pipeline (§2.1): an empty filter
/// (nothing wanted, nothing kept), no board groups, and [`RunSettings::default`].
pub fn default_filter_patterns() -> FilterPatterns {
    FilterPatterns::default()
}

pub fn default_boards_config() -> BoardsConfig {
    BoardsConfig::default()
}

pub fn default_run_settings() -> RunSettings {
    RunSettings::default()
}
