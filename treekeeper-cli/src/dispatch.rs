//! Subcommand bodies: translates parsed CLI args into calls against
//! `treekeeper-core`/`treekeeper-kernel` and reports outcomes the way the
//! teacher's actions report theirs — a short human status line, details at
//! `info`/`debug` level.

use std::error::Error;

use tracing::info;
use treekeeper_core::config::{self, CliOverrides};
use treekeeper_core::driver::BranchDriver;
use treekeeper_core::rewriter::{HistoryRewriter, NullObserver, RewriteOptions, TracingObserver};
use treekeeper_core::GitRunner;
use treekeeper_kernel::{Orchestrator, OrchestratorConfig};

use crate::args::{BranchDriverCli, DriverPhase, RewriteHistoryCli, VerifyBoardsCli};
use crate::status;

fn overrides_from_global(global: &crate::args::GlobalOpts, exact_path_file: Option<std::path::PathBuf>) -> CliOverrides {
    CliOverrides {
        annotation_key: None,
        verbose: global.verbose > 0,
        quiet: global.quiet,
        dry_run: global.dry_run,
        exact_path_file,
    }
}

pub async fn run_rewrite_history(args: RewriteHistoryCli) -> Result<(), Box<dyn Error>> {
    crate::logging::init(args.global.verbose, args.global.quiet);

    let overrides = overrides_from_global(&args.global, args.filter_files.clone());
    let loaded = config::load(args.global.config_file.as_deref(), overrides)?;
    let filter = loaded.filter;

    let runner = GitRunner::new(args.repo.clone());
    let options = RewriteOptions {
        window: if args.filter_files.is_some() { 1000 } else { args.window },
        annotation_key: loaded.run.annotation_key,
        ..RewriteOptions::default()
    };

    if args.global.dry_run {
        println!(
            "would rewrite {} -> {} (window={})",
            args.parent_filtered, args.goal, options.window
        );
        return Ok(());
    }

    let mut rewriter = HistoryRewriter::new(&runner, &filter, &args.parent_filtered, options)?;
    let observer = TracingObserver;
    let head = rewriter.rewrite(&args.goal, &observer)?;
    info!(new_head = %head, "rewrite-history completed");
    println!("{head}");
    Ok(())
}

pub async fn run_branch_driver(args: BranchDriverCli) -> Result<(), Box<dyn Error>> {
    crate::logging::init(args.global.verbose, args.global.quiet);

    let overrides = overrides_from_global(&args.global, None);
    let loaded = config::load(args.global.config_file.as_deref(), overrides)?;

    let runner = GitRunner::new(args.repo.clone());
    let driver = BranchDriver::new(&runner, &loaded.filter);
    let observer = NullObserver;

    if args.global.dry_run {
        println!("would run {:?} on {}", args.phase, args.current);
        return Ok(());
    }

    let result = match args.phase {
        DriverPhase::Delete => {
            let cursor = require(args.original_cursor.as_deref(), "--original-cursor")?;
            let head = driver.delete(&args.current, cursor)?;
            info!(%head, "delete phase completed");
            head
        }
        DriverPhase::Add { initial_commit } => {
            let cursor = require(args.original_cursor.as_deref(), "--original-cursor")?;
            driver.add(&args.current, cursor, &initial_commit, &observer)?
        }
        DriverPhase::Forward => {
            let target = require(args.target.as_deref(), "--target")?;
            driver.forward(&args.current, target, &observer)?
        }
        DriverPhase::All { initial_commit } => {
            let target = require(args.target.as_deref(), "--target")?;
            let cursor = require(args.original_cursor.as_deref(), "--original-cursor")?;
            driver.run_all(&args.current, target, cursor, initial_commit.as_deref(), &observer)?
        }
    };

    println!("{result}");
    Ok(())
}

fn require<'a>(value: Option<&'a str>, flag: &'static str) -> Result<&'a str, Box<dyn Error>> {
    value.ok_or_else(|| format!("{flag} is required for this phase").into())
}

pub async fn run_verify_boards(args: VerifyBoardsCli) -> Result<(), Box<dyn Error>> {
    crate::logging::init(args.global.verbose, args.global.quiet);

    let overrides = overrides_from_global(&args.global, None);
    let loaded = config::load(args.global.config_file.as_deref(), overrides)?;

    let boards: Vec<String> = args
        .boards
        .iter()
        .flat_map(|token| loaded.boards.resolve(token))
        .collect();
    if boards.is_empty() {
        return Err("no boards resolved from the given --board tokens".into());
    }

    let config = OrchestratorConfig {
        k_setup: args.k_setup.unwrap_or(loaded.run.k_setup),
        k_build: args.k_build.unwrap_or(loaded.run.k_build),
        k_emerge: args.k_emerge.unwrap_or(loaded.run.k_emerge),
        component: args.component.unwrap_or_else(|| "chromeos-base/libchrome".to_string()),
        output_dir: args.output_dir.clone(),
    };

    if args.global.dry_run {
        println!("would verify {} boards against {}", boards.len(), config.component);
        return Ok(());
    }

    std::fs::create_dir_all(&args.output_dir)?;

    let orchestrator = std::sync::Arc::new(Orchestrator::new(config));
    let display = status::spawn(orchestrator.clone());

    let matrix = orchestrator.run(boards).await?;
    status::stop(display).await;

    if matrix.has_any_failure() {
        eprintln!("one or more packages failed to emerge; see matrix.txt");
        std::process::exit(1);
    }
    println!("all packages emerged cleanly on every board");
    Ok(())
}
