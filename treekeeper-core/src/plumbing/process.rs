use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::GitProcessError;

/// Invokes the `git` binary in a fixed repository directory and returns
/// captured, decoded (or raw) output. All fatal git errors surface through
/// here so every caller gets the same argv/status/stderr context (§7).
#[derive(Debug, Clone)]
pub struct GitRunner {
    repo_dir: PathBuf,
}

impl GitRunner {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    fn argv_label(args: &[&str]) -> String {
        args.join(" ")
    }

    /// Runs `git <args>` and returns raw stdout bytes on success.
    pub fn run_raw(&self, args: &[&str]) -> Result<Vec<u8>, GitProcessError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_dir)
            .args(args)
            .output()
            .map_err(|source| GitProcessError::Spawn {
                args: Self::argv_label(args),
                source,
            })?;

        if !output.status.success() {
            return Err(GitProcessError::NonZeroExit {
                args: Self::argv_label(args),
                status: output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(output.stdout)
    }

    /// Runs `git <args>` and returns stdout decoded as a lossy UTF-8 string
    /// with one trailing newline trimmed, if present.
    pub fn run_text(&self, args: &[&str]) -> Result<String, GitProcessError> {
        let raw = self.run_raw(args)?;
        let mut text = String::from_utf8_lossy(&raw).into_owned();
        if text.ends_with('\n') {
            text.pop();
        }
        Ok(text)
    }

    /// Feeds `stdin` to `git <args>` and returns stdout, used by tree/commit
    /// construction (`git mktree`, `git hash-object`, `git commit-tree`).
    pub fn run_with_stdin(&self, args: &[&str], stdin: &[u8]) -> Result<String, GitProcessError> {
        use std::io::Write;
        use std::process::Stdio;

        let mut child = Command::new("git")
            .arg("-C")
            .arg(&self.repo_dir)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| GitProcessError::Spawn {
                args: Self::argv_label(args),
                source,
            })?;

        child
            .stdin
            .take()
            .expect("stdin was piped")
            .write_all(stdin)
            .map_err(|source| GitProcessError::Spawn {
                args: Self::argv_label(args),
                source,
            })?;

        let output = child.wait_with_output().map_err(|source| GitProcessError::Spawn {
            args: Self::argv_label(args),
            source,
        })?;

        if !output.status.success() {
            return Err(GitProcessError::NonZeroExit {
                args: Self::argv_label(args),
                status: output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.ends_with('\n') {
            text.pop();
        }
        Ok(text)
    }

    /// Like [`Self::run_with_stdin`], but with extra environment variables
    /// set on the child (used to pin author/committer identity for
    /// `commit-tree`).
    pub fn run_with_stdin_env(
        &self,
        args: &[&str],
        stdin: &[u8],
        envs: &[(&str, &str)],
    ) -> Result<String, GitProcessError> {
        use std::io::Write;
        use std::process::Stdio;

        let mut command = Command::new("git");
        command
            .arg("-C")
            .arg(&self.repo_dir)
            .args(args)
            .envs(envs.iter().copied())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| GitProcessError::Spawn {
            args: Self::argv_label(args),
            source,
        })?;

        child
            .stdin
            .take()
            .expect("stdin was piped")
            .write_all(stdin)
            .map_err(|source| GitProcessError::Spawn {
                args: Self::argv_label(args),
                source,
            })?;

        let output = child.wait_with_output().map_err(|source| GitProcessError::Spawn {
            args: Self::argv_label(args),
            source,
        })?;

        if !output.status.success() {
            return Err(GitProcessError::NonZeroExit {
                args: Self::argv_label(args),
                status: output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.ends_with('\n') {
            text.pop();
        }
        Ok(text)
    }
}
