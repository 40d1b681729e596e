//! Abstraction over the external, board-aware tools the Build Orchestrator
//! shells out to (§4.6: `setup_board`, `build_packages`, `cros_workon`,
//! `emerge`, the dependency enumerator). Generalizes the teacher's pattern
//! of spawning a subprocess and streaming its stdout/stderr lines into a
//! progress sink (`vizier-core`'s Codex runner).

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::error::OrchestratorError;

/// One line of subprocess output, tagged by stream, as it's produced.
#[derive(Debug, Clone)]
pub enum ToolLine {
    Stdout(String),
    Stderr(String),
}

/// Everything the orchestrator needs from invoking an external tool for one
/// board/package operation: its collected output lines and exit status.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub lines: Vec<ToolLine>,
    pub success: bool,
}

impl ToolOutput {
    /// All lines, stdout and stderr interleaved in arrival order, joined by
    /// newlines — what the state machine persists as a board's `message`.
    pub fn combined_message(&self) -> String {
        self.lines
            .iter()
            .map(|l| match l {
                ToolLine::Stdout(s) | ToolLine::Stderr(s) => s.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Runs an external tool binary with the given arguments, streaming both
/// stdout and stderr lines as they arrive rather than buffering to
/// completion (§4.6: "stream stdout/stderr lines into `message`").
pub async fn run_tool(
    board: &str,
    bin: &str,
    args: &[&str],
) -> Result<ToolOutput, OrchestratorError> {
    let mut command = Command::new(bin);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| OrchestratorError::Spawn {
        board: board.to_string(),
        tool: bin.to_string(),
        args: args.join(" "),
        source,
    })?;

    let stdout = child.stdout.take().expect("stdout piped");
    let stderr = child.stderr.take().expect("stderr piped");

    let mut lines = Vec::new();

    let mut stdout_reader = BufReader::new(stdout).lines();
    let mut stderr_reader = BufReader::new(stderr).lines();

    loop {
        tokio::select! {
            line = stdout_reader.next_line() => match line {
                Ok(Some(text)) => lines.push(ToolLine::Stdout(text)),
                Ok(None) => break,
                Err(_) => break,
            },
            line = stderr_reader.next_line() => match line {
                Ok(Some(text)) => lines.push(ToolLine::Stderr(text)),
                Ok(None) => continue,
                Err(_) => continue,
            },
        }
    }

    // Drain whichever reader still has buffered lines once the other side
    // has closed (`select!` above exits as soon as stdout ends).
    while let Ok(Some(text)) = stderr_reader.next_line().await {
        lines.push(ToolLine::Stderr(text));
    }

    let status = child
        .wait()
        .await
        .map_err(|source| OrchestratorError::Spawn {
            board: board.to_string(),
            tool: bin.to_string(),
            args: args.join(" "),
            source,
        })?;

    Ok(ToolOutput {
        lines,
        success: status.success(),
    })
}
