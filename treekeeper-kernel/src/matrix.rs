//! Failure matrix output (§4.6): a board x package table of which packages
//! failed to emerge on which boards, written as both a human-readable
//! aligned table (`matrix.txt`) and CSV (`matrix.csv`), grounded in the
//! original's `State.failed_matrix()`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::board::BoardState;
use crate::error::OrchestratorError;

/// Board x package failure table, built once a run has finished.
#[derive(Debug, Clone, Default)]
pub struct FailedMatrix {
    boards: Vec<String>,
    /// package -> board -> failed
    rows: BTreeMap<String, BTreeMap<String, bool>>,
}

impl FailedMatrix {
    pub fn from_boards(states: &[BoardState]) -> Self {
        let boards: Vec<String> = states.iter().map(|s| s.board.clone()).collect();
        let mut packages: BTreeSet<String> = BTreeSet::new();
        for state in states {
            packages.extend(state.packages_to_verify.iter().cloned());
        }

        let mut rows: BTreeMap<String, BTreeMap<String, bool>> = BTreeMap::new();
        for package in packages {
            let mut row = BTreeMap::new();
            for state in states {
                row.insert(state.board.clone(), state.failed_packages.contains(&package));
            }
            rows.insert(package, row);
        }

        Self { boards, rows }
    }

    pub fn has_any_failure(&self) -> bool {
        self.rows.values().any(|row| row.values().any(|&failed| failed))
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("package");
        for board in &self.boards {
            out.push('\t');
            out.push_str(board);
        }
        out.push('\n');

        for (package, row) in &self.rows {
            out.push_str(package);
            for board in &self.boards {
                out.push('\t');
                out.push_str(if row.get(board).copied().unwrap_or(false) { "FAIL" } else { "ok" });
            }
            out.push('\n');
        }
        out
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str("package");
        for board in &self.boards {
            out.push(',');
            out.push_str(board);
        }
        out.push('\n');

        for (package, row) in &self.rows {
            out.push_str(package);
            for board in &self.boards {
                out.push(',');
                out.push(if row.get(board).copied().unwrap_or(false) { '1' } else { '0' });
            }
            out.push('\n');
        }
        out
    }

    pub fn write_to(&self, dir: &Path) -> Result<(), OrchestratorError> {
        let txt_path = dir.join("matrix.txt");
        let csv_path = dir.join("matrix.csv");
        std::fs::write(&txt_path, self.to_text()).map_err(|source| OrchestratorError::Io {
            what: "matrix.txt",
            path: txt_path,
            source,
        })?;
        std::fs::write(&csv_path, self.to_csv()).map_err(|source| OrchestratorError::Io {
            what: "matrix.csv",
            path: csv_path,
            source,
        })?;
        Ok(())
    }
}

/// Writes a machine-readable snapshot of every board's final state
/// (`boards.json`), for callers that want structured per-package detail
/// the text/CSV matrix doesn't carry (which packages passed, not just which
/// failed).
pub fn write_board_snapshot(states: &[BoardState], dir: &Path) -> Result<(), OrchestratorError> {
    let path = dir.join("boards.json");
    let json = serde_json::to_string_pretty(states).map_err(|source| OrchestratorError::Io {
        what: "boards.json",
        path: path.clone(),
        source: std::io::Error::new(std::io::ErrorKind::Other, source),
    })?;
    std::fs::write(&path, json).map_err(|source| OrchestratorError::Io {
        what: "boards.json",
        path,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardPhase;

    #[test]
    fn renders_failures_as_a_grid() {
        let mut a = BoardState::new("board-a", "chromeos-base/libchrome");
        a.packages_to_verify = vec!["dev-libs/foo".to_string(), "dev-libs/bar".to_string()];
        a.failed_packages.insert("dev-libs/foo".to_string());
        a.update(BoardPhase::Emerge, "running");

        let mut b = BoardState::new("board-b", "chromeos-base/libchrome");
        b.packages_to_verify = vec!["dev-libs/foo".to_string()];

        let matrix = FailedMatrix::from_boards(&[a, b]);
        assert!(matrix.has_any_failure());
        let text = matrix.to_text();
        assert!(text.contains("dev-libs/foo"));
        assert!(text.contains("FAIL"));
    }
}
