//! Parallel cross-compile build-verification orchestrator (§4.6). Runs each
//! board's setup/build/enumerate phases under their own concurrency caps,
//! then emerges every dependent package across all boards under a single
//! shared cap, using the cycle-break scheduler to keep making progress
//! through dependency cycles.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::board::{BoardPhase, BoardState};
use crate::error::OrchestratorError;
use crate::matrix::FailedMatrix;
use crate::scheduler::graph::{build_dependency_graph, parse_depended_by};
use crate::scheduler::{buildable_packages, Decision};
use crate::tool::run_tool;

/// Concurrency caps and paths for one orchestrator run. `k_emerge` defaults
/// to 50 in production and is lowered (32 in the original) under test.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub k_setup: usize,
    pub k_build: usize,
    pub k_emerge: usize,
    pub component: String,
    pub output_dir: PathBuf,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            k_setup: 1,
            k_build: 3,
            k_emerge: 50,
            component: "chromeos-base/libchrome".to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

pub struct Orchestrator {
    config: OrchestratorConfig,
    setup_permits: Arc<Semaphore>,
    build_permits: Arc<Semaphore>,
    emerge_permits: Arc<Semaphore>,
    states: Arc<Mutex<BTreeMap<String, BoardState>>>,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            setup_permits: Arc::new(Semaphore::new(config.k_setup)),
            build_permits: Arc::new(Semaphore::new(config.k_build)),
            emerge_permits: Arc::new(Semaphore::new(config.k_emerge)),
            states: Arc::new(Mutex::new(BTreeMap::new())),
            config,
        }
    }

    /// Snapshot of every board's current state, for the status display.
    pub fn snapshot(&self) -> Vec<BoardState> {
        self.states.lock().values().cloned().collect()
    }

    /// Runs the full board list to completion and returns the failure
    /// matrix. Boards proceed through setup/build/enumerate independently;
    /// once a board has a verify-set, its packages join the shared emerge
    /// scheduling loop alongside every other board's.
    pub async fn run(&self, boards: Vec<String>) -> Result<FailedMatrix, OrchestratorError> {
        {
            let mut states = self.states.lock();
            for board in &boards {
                states.insert(
                    board.clone(),
                    BoardState::new(board.clone(), self.config.component.clone()),
                );
            }
        }

        let mut prep = JoinSet::new();
        for board in &boards {
            let board = board.clone();
            let setup_permits = self.setup_permits.clone();
            let build_permits = self.build_permits.clone();
            let states = self.states.clone();
            let output_dir = self.config.output_dir.clone();
            let component = self.config.component.clone();
            prep.spawn(async move {
                run_board_prep(board, component, output_dir, setup_permits, build_permits, states)
                    .await
            });
        }
        while prep.join_next().await.is_some() {}

        self.run_emerge_scheduling_loop().await?;

        let snapshot = self.snapshot();
        let matrix = FailedMatrix::from_boards(&snapshot);
        matrix.write_to(&self.config.output_dir)?;
        crate::matrix::write_board_snapshot(&snapshot, &self.config.output_dir)?;
        Ok(matrix)
    }

    async fn run_emerge_scheduling_loop(&self) -> Result<(), OrchestratorError> {
        let mut in_flight: JoinSet<(String, String, bool)> = JoinSet::new();

        loop {
            let mut scheduled_any = false;
            {
                let mut states = self.states.lock();
                for state in states.values_mut() {
                    if state.phase.is_terminal_failure() || state.phase == BoardPhase::Done {
                        continue;
                    }
                    if state.packages_to_verify.is_empty() {
                        continue;
                    }
                    let decision = buildable_packages(
                        &state.packages_to_verify,
                        &state.dependency_graph,
                        &state.scheduled,
                        &state.completed,
                    );
                    match decision {
                        Decision::Done => {
                            state.update(BoardPhase::Done, "all packages emerged");
                        }
                        Decision::Wait => {}
                        Decision::Buildable(packages) => {
                            for package in packages {
                                state.mark_emerge_scheduled(&package);
                                state.update(BoardPhase::Emerge, state.emerge_progress_message());
                                let board = state.board.clone();
                                let emerge_permits = self.emerge_permits.clone();
                                let output_dir = self.config.output_dir.clone();
                                in_flight.spawn(async move {
                                    let _permit = emerge_permits.acquire_owned().await;
                                    let success = emerge_package(&board, &package, &output_dir).await;
                                    (board, package, success)
                                });
                                scheduled_any = true;
                            }
                        }
                    }
                }
            }

            if in_flight.is_empty() {
                if !scheduled_any {
                    break;
                }
                continue;
            }

            if let Some(joined) = in_flight.join_next().await {
                match joined {
                    Ok((board, package, success)) => {
                        let mut states = self.states.lock();
                        if let Some(state) = states.get_mut(&board) {
                            state.mark_emerge_result(&package, success);
                            state.update(BoardPhase::Emerge, state.emerge_progress_message());
                        }
                    }
                    Err(join_err) => {
                        warn!("emerge task panicked: {join_err}");
                    }
                }
            }
        }

        Ok(())
    }
}

async fn run_board_prep(
    board: String,
    component: String,
    output_dir: PathBuf,
    setup_permits: Arc<Semaphore>,
    build_permits: Arc<Semaphore>,
    states: Arc<Mutex<BTreeMap<String, BoardState>>>,
) {
    let log_dir = output_dir.join("by-board").join(&board);

    {
        let _permit = setup_permits.acquire().await;
        update(&states, &board, BoardPhase::SetupBoard, "running setup_board");
        match run_tool(&board, "setup_board", &["--board", &board]).await {
            Ok(output) if output.success => {
                update(&states, &board, BoardPhase::SetupBoard, "setup_board completed");
            }
            Ok(output) => {
                update(&states, &board, BoardPhase::Failed, output.combined_message());
                return;
            }
            Err(err) => {
                update(&states, &board, BoardPhase::Bug, err.to_string());
                return;
            }
        }
    }

    {
        let _permit = build_permits.acquire().await;
        update(&states, &board, BoardPhase::CrosWorkonStop, "cros_workon stop");
        if run_tool(&board, "cros_workon", &["--board", &board, "stop", "libchrome"])
            .await
            .map(|o| o.success)
            .unwrap_or(false)
        {
            update(&states, &board, BoardPhase::BuildPackages, "running build_packages");
            let mut build_ok = false;
            for _trial in 0..3 {
                match run_tool(&board, "build_packages", &["--board", &board]).await {
                    Ok(output) if output.success => {
                        build_ok = true;
                        break;
                    }
                    Ok(_) => continue,
                    Err(err) => {
                        update(&states, &board, BoardPhase::Bug, err.to_string());
                        return;
                    }
                }
            }
            if !build_ok {
                update(
                    &states,
                    &board,
                    BoardPhase::Failed,
                    "build_packages failed. further steps skipped.",
                );
                return;
            }
            update(&states, &board, BoardPhase::BuildPackages, "build_packages completed");
        } else {
            update(&states, &board, BoardPhase::Failed, "cros_workon stop failed");
            return;
        }
    }

    {
        update(&states, &board, BoardPhase::CrosWorkonStart, "cros_workon start");
        let started = run_tool(&board, "cros_workon", &["--board", &board, "start", "libchrome"])
            .await
            .map(|o| o.success)
            .unwrap_or(false);
        if !started {
            update(&states, &board, BoardPhase::Failed, "cros_workon start failed");
            return;
        }

        update(&states, &board, BoardPhase::EmergeComponent, format!("emerging {component}"));
        let emerged = run_tool(&board, "emerge", &["--board", &board, &component])
            .await
            .map(|o| o.success)
            .unwrap_or(false);
        if !emerged {
            update(&states, &board, BoardPhase::Failed, format!("emerge {component} failed"));
            return;
        }
    }

    update(&states, &board, BoardPhase::EnumerateDependencies, "listing dependents");
    let equery_bin = format!("equery-{board}");
    let packages = match run_tool(&board, &equery_bin, &["d", &component]).await {
        Ok(output) if output.success => parse_depended_by(&output.combined_message()),
        Ok(output) => {
            update(&states, &board, BoardPhase::Failed, output.combined_message());
            return;
        }
        Err(err) => {
            update(&states, &board, BoardPhase::Bug, err.to_string());
            return;
        }
    };

    // Query each verify-set package's own dependents in turn; the scheduler
    // needs the full per-package edge set, not just the top-level component's.
    let mut depended_by = BTreeMap::new();
    for package in &packages {
        update(
            &states,
            &board,
            BoardPhase::EnumerateDependencies,
            format!("enumerating packages depending on {package}"),
        );
        match run_tool(&board, &equery_bin, &["d", package]).await {
            Ok(output) if output.success => {
                depended_by.insert(package.clone(), parse_depended_by(&output.combined_message()));
            }
            Ok(output) => {
                update(
                    &states,
                    &board,
                    BoardPhase::Bug,
                    OrchestratorError::DependencyParse {
                        package: package.clone(),
                        detail: output.combined_message(),
                    }
                    .to_string(),
                );
                return;
            }
            Err(err) => {
                update(&states, &board, BoardPhase::Bug, err.to_string());
                return;
            }
        }
    }

    let graph = build_dependency_graph(&packages, &depended_by);
    let mut states_guard = states.lock();
    if let Some(state) = states_guard.get_mut(&board) {
        state.packages_to_verify = packages;
        state.dependency_graph = graph;
        state.update(BoardPhase::Pending, "awaiting emerge scheduling");
    }
    drop(states_guard);
    let _ = std::fs::create_dir_all(&log_dir);
}

async fn emerge_package(board: &str, package: &str, output_dir: &Path) -> bool {
    let log_dir = output_dir.join("by-board").join(board).join(package);
    if std::fs::create_dir_all(&log_dir).is_err() {
        return false;
    }
    let result = run_tool(board, "emerge", &["--board", board, package]).await;
    match result {
        Ok(output) if output.success => {
            let _ = std::fs::remove_dir_all(&log_dir);
            true
        }
        Ok(output) => {
            let log_path = log_dir.join("emerge_log");
            let _ = std::fs::write(log_path, output.combined_message());
            false
        }
        Err(_) => false,
    }
}

fn update(
    states: &Arc<Mutex<BTreeMap<String, BoardState>>>,
    board: &str,
    phase: BoardPhase,
    message: impl Into<String>,
) {
    let message = message.into();
    info!(board, ?phase, %message, "board phase transition");
    if let Some(state) = states.lock().get_mut(board) {
        state.update(phase, message);
    }
}
