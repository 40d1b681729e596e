//! clap-derive argument definitions for the three binaries (§5). Each
//! subcommand carries its own [`GlobalOpts`] so `-v`/`-q`/`-C` behave
//! identically across `rewrite-history`, `branch-driver`, and
//! `verify-boards`.

use std::path::PathBuf;

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};

#[derive(ClapArgs, Debug, Default)]
pub struct GlobalOpts {
    /// Increase log verbosity (`-v` = info, `-vv` = debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence everything but errors
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Layered TOML config file (§2.1)
    #[arg(short = 'C', long = "config-file", global = true)]
    pub config_file: Option<PathBuf>,

    /// Describe the run without invoking git/portage tools
    #[arg(long, global = true)]
    pub dry_run: bool,
}

/// `rewrite-history`: runs the History Rewriter (§4.4) from a filtered
/// branch's current head up to an upstream goal commit.
#[derive(Parser, Debug)]
#[command(name = "rewrite-history", version, about)]
pub struct RewriteHistoryCli {
    #[command(flatten)]
    pub global: GlobalOpts,

    /// Path to the git repository to operate in
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Current head of the filtered branch to resume from
    #[arg(long)]
    pub parent_filtered: String,

    /// Upstream commit to rewrite history up to
    #[arg(long)]
    pub goal: String,

    /// Look-forward compression window; 0 disables it
    #[arg(long, default_value_t = 0)]
    pub window: usize,

    /// Exact-path override file, replacing the loaded filter wholesale
    /// (`--filter_files`, §3.1)
    #[arg(long = "filter-files")]
    pub filter_files: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DriverPhase {
    /// Drop files the filter no longer wants
    Delete,
    /// Recover newly-wanted files from a side branch (§4.5)
    Add {
        /// Upstream commit the ADD-phase side branch starts from
        #[arg(long)]
        initial_commit: String,
    },
    /// Ordinary rewrite from `current` up to `target`
    Forward,
    /// Run DELETE, optional ADD, then FORWARD in sequence, with a
    /// pre-FORWARD consistency check
    All {
        #[arg(long)]
        initial_commit: Option<String>,
    },
}

/// `branch-driver`: runs one phase (or all phases) of the Upstream Branch
/// Driver (§4.5).
#[derive(Parser, Debug)]
#[command(name = "branch-driver", version, about)]
pub struct BranchDriverCli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    #[command(subcommand)]
    pub phase: DriverPhase,

    /// Current filtered-branch head
    #[arg(long)]
    pub current: String,

    /// Upstream target commit (required for `forward`/`all`)
    #[arg(long)]
    pub target: Option<String>,

    /// Annotated original-commit cursor on `current` (required for
    /// `delete`/`add`/`all`)
    #[arg(long)]
    pub original_cursor: Option<String>,
}

/// `verify-boards`: runs the Build Orchestrator (§4.6) across a set of
/// boards, verifying every dependent package still emerges.
#[derive(Parser, Debug)]
#[command(name = "verify-boards", version, about)]
pub struct VerifyBoardsCli {
    #[command(flatten)]
    pub global: GlobalOpts,

    /// Board names or board-group tokens (resolved via the boards config)
    #[arg(long = "board", required = true)]
    pub boards: Vec<String>,

    /// Component whose dependents are verified (default:
    /// chromeos-base/libchrome)
    #[arg(long)]
    pub component: Option<String>,

    /// Directory to write per-board logs and the failure matrix to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(long)]
    pub k_setup: Option<usize>,

    #[arg(long)]
    pub k_build: Option<usize>,

    #[arg(long)]
    pub k_emerge: Option<usize>,
}
