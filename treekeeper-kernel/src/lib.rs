//! Parallel cross-compile build-verification orchestrator (§4.6): drives
//! `setup_board` / `build_packages` / `cros_workon` / `emerge` across many
//! boards concurrently, tracks per-board state, and schedules dependent
//! package emerges through a cycle-breaking scheduler.

pub mod board;
pub mod error;
pub mod matrix;
pub mod orchestrator;
pub mod scheduler;
pub mod tool;

pub use board::{BoardPhase, BoardState};
pub use error::OrchestratorError;
pub use matrix::FailedMatrix;
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use scheduler::{buildable_packages, Decision};
