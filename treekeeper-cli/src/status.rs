//! Once-per-second terminal status display for `verify-boards` (§4.6),
//! generalized from the teacher's single-spinner `display_status` loop
//! into one line per board.

use std::sync::Arc;

use colored::Colorize;
use crossterm::cursor::MoveToColumn;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};

use treekeeper_kernel::{BoardPhase, Orchestrator};

pub struct Display {
    handle: JoinHandle<()>,
    stop_tx: oneshot::Sender<()>,
}

pub fn spawn(orchestrator: Arc<Orchestrator>) -> Display {
    let (stop_tx, mut stop_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(1));
        let mut last_lines = 0usize;
        loop {
            tokio::select! {
                _ = &mut stop_rx => break,
                _ = ticker.tick() => {
                    let states = orchestrator.snapshot();
                    render(&states, &mut last_lines);
                }
            }
        }
    });
    Display { handle, stop_tx }
}

pub async fn stop(display: Display) {
    let _ = display.stop_tx.send(());
    let _ = display.handle.await;
}

fn render(states: &[treekeeper_kernel::BoardState], last_lines: &mut usize) {
    for _ in 0..*last_lines {
        let _ = execute!(std::io::stderr(), MoveToColumn(0), Clear(ClearType::CurrentLine));
    }

    for state in states {
        let label = format!("{:<16}", state.board);
        let line = match state.phase {
            BoardPhase::Failed | BoardPhase::Bug => format!("{} {}", label.red(), state.message),
            BoardPhase::Done => format!("{} {}", label.green(), state.message),
            _ => format!("{} {:?} {}", label.blue(), state.phase, state.message),
        };
        eprintln!("{line}");
    }
    *last_lines = states.len();
}
