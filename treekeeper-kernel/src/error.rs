use thiserror::Error;

/// Recoverable errors from the Build Orchestrator (§4.6): a board phase
/// failing transitions that board to `failed`/`bug` rather than aborting
/// the whole run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("failed to spawn `{tool} {args}` for board {board}: {source}")]
    Spawn {
        board: String,
        tool: String,
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{tool} {args}` for board {board} exited with {status}")]
    NonZeroExit {
        board: String,
        tool: String,
        args: String,
        status: String,
    },

    #[error("could not parse dependency listing for package {package}: {detail}")]
    DependencyParse { package: String, detail: String },

    #[error("failed to write {what} to {path}: {source}")]
    Io {
        what: &'static str,
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = OrchestratorError> = std::result::Result<T, E>;
