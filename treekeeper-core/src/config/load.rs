use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::FilterError;
use crate::filter::FilterConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path} as TOML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Filter(#[from] FilterError),
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = read_file(path)?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a `--filter_files PATH` exact-path override: one path per line,
/// blank lines ignored (§3.1, mirroring the original tool's behavior of
/// reading the file as a flat list of `bytes` paths).
pub fn read_exact_path_override(path: &Path) -> Result<Vec<Vec<u8>>, ConfigError> {
    let contents = read_file(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.as_bytes().to_vec())
        .collect())
}

/// CLI-flag overrides applied after the optional TOML file layer (§2.1).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub annotation_key: Option<String>,
    pub verbose: bool,
    pub quiet: bool,
    pub dry_run: bool,
    pub exact_path_file: Option<PathBuf>,
}

pub struct LoadedConfig {
    pub filter: FilterConfig,
    pub boards: BoardsConfig,
    pub run: RunSettings,
}

/// Full layering pipeline (§2.1): `defaults()` → optional TOML file → CLI
/// flag overrides, producing a compiled [`FilterConfig`], a [`BoardsConfig`],
/// and [`RunSettings`].
///
/// `overrides.exact_path_file`, when set, takes over the filter entirely:
/// it builds a WANT-only exact-match [`FilterConfig`] from the override
/// file's paths and ignores every pattern list loaded from `config_file`,
/// matching `--filter_files`'s behavior in the original tool.
pub fn load(config_file: Option<&Path>, overrides: CliOverrides) -> Result<LoadedConfig, ConfigError> {
    let mut patterns = default_filter_patterns();
    let mut boards = default_boards_config();
    let mut run = default_run_settings();

    if let Some(path) = config_file {
        let file = read_config_file(path)?;
        file.filter.extend_into(&mut patterns);
        boards.apply_layer(&file.boards);
        run.apply_layer(&file.run);
    }

    if let Some(key) = overrides.annotation_key {
        run.annotation_key = key;
    }
    run.verbose = run.verbose || overrides.verbose;
    run.quiet = run.quiet || overrides.quiet;
    run.dry_run = run.dry_run || overrides.dry_run;

    let filter = match overrides.exact_path_file.as_deref() {
        Some(path) => {
            let paths = read_exact_path_override(path)?;
            FilterConfig::exact_paths(&paths)?
        }
        None => FilterConfig::compile(&patterns)?,
    };

    Ok(LoadedConfig { filter, boards, run })
}
