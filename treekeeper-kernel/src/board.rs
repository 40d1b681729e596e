//! Per-board state machine (§4.6). Mirrors the original tool's `CheckOneBoard`:
//! a phase name plus a free-form detail message, and the emerge bookkeeping
//! (`scheduled`/`completed`/`passing`/`failed`) that drives the cross-board
//! scheduler in [`crate::scheduler`].

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

/// Where a board currently sits in its sequential phase list. Failure in any
/// phase moves the board to `Failed` (or `Bug`, for an orchestration-level
/// panic/semaphore leak) and every later phase submission for it is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardPhase {
    Pending,
    SetupBoard,
    BuildPackages,
    CrosWorkonStart,
    CrosWorkonStop,
    EmergeComponent,
    EnumerateDependencies,
    Emerge,
    Failed,
    Bug,
    Done,
}

impl BoardPhase {
    /// A board in this phase accepts no further phase submissions (§4.6).
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, BoardPhase::Failed | BoardPhase::Bug)
    }
}

/// Snapshot of one board's progress, read by the status display and by the
/// scheduler.
#[derive(Debug, Clone, Serialize)]
pub struct BoardState {
    pub board: String,
    pub phase: BoardPhase,
    pub message: String,
    pub component: String,

    pub packages_to_verify: Vec<String>,
    pub dependency_graph: BTreeMap<String, Vec<String>>,
    pub scheduled: HashSet<String>,
    pub completed: HashSet<String>,
    pub passing: HashSet<String>,
    pub failed_packages: HashSet<String>,
}

impl BoardState {
    pub fn new(board: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            board: board.into(),
            phase: BoardPhase::Pending,
            message: String::new(),
            component: component.into(),
            packages_to_verify: Vec::new(),
            dependency_graph: BTreeMap::new(),
            scheduled: HashSet::new(),
            completed: HashSet::new(),
            passing: HashSet::new(),
            failed_packages: HashSet::new(),
        }
    }

    pub fn update(&mut self, phase: BoardPhase, message: impl Into<String>) {
        self.phase = phase;
        self.message = message.into();
    }

    pub fn mark_emerge_scheduled(&mut self, package: &str) {
        self.scheduled.insert(package.to_string());
    }

    pub fn mark_emerge_result(&mut self, package: &str, success: bool) {
        self.scheduled.remove(package);
        self.completed.insert(package.to_string());
        if success {
            self.passing.insert(package.to_string());
        } else {
            self.failed_packages.insert(package.to_string());
        }
    }

    pub fn emerge_progress_message(&self) -> String {
        format!(
            "Queued/Running:{}, Completed:{} (Passing:{}, Failed:{}), Total:{}",
            self.scheduled.len(),
            self.completed.len(),
            self.passing.len(),
            self.failed_packages.len(),
            self.packages_to_verify.len(),
        )
    }

    pub fn all_packages_completed(&self) -> bool {
        self.completed.len() >= self.packages_to_verify.len()
    }
}
