#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;
use treekeeper_core::GitRunner;

pub(crate) type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// A throwaway git repository plus the `GitRunner` pointed at it, torn down
/// when dropped.
pub(crate) struct TempRepo {
    _dir: TempDir,
    pub(crate) runner: GitRunner,
    path: std::path::PathBuf,
}

impl TempRepo {
    pub(crate) fn init() -> TestResult<Self> {
        let dir = TempDir::new()?;
        run_git(dir.path(), &["init", "--quiet"])?;
        run_git(dir.path(), &["config", "user.name", "treekeeper-tests"])?;
        run_git(dir.path(), &["config", "user.email", "treekeeper-tests@localhost"])?;
        let runner = GitRunner::new(dir.path());
        Ok(Self { path: dir.path().to_path_buf(), _dir: dir, runner })
    }

    /// Writes `contents` to `relative_path`, stages it, and commits,
    /// returning the new commit hash.
    pub(crate) fn commit_file(&self, relative_path: &str, contents: &str, message: &str) -> TestResult<String> {
        let full = self.path.join(relative_path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full, contents)?;
        run_git(&self.path, &["add", relative_path])?;
        run_git(&self.path, &["commit", "--quiet", "-m", message])?;
        let hash = run_git(&self.path, &["rev-parse", "HEAD"])?;
        Ok(hash.trim().to_string())
    }

    pub(crate) fn remove_file(&self, relative_path: &str, message: &str) -> TestResult<String> {
        run_git(&self.path, &["rm", "--quiet", relative_path])?;
        run_git(&self.path, &["commit", "--quiet", "-m", message])?;
        let hash = run_git(&self.path, &["rev-parse", "HEAD"])?;
        Ok(hash.trim().to_string())
    }

    pub(crate) fn head(&self) -> TestResult<String> {
        Ok(run_git(&self.path, &["rev-parse", "HEAD"])?.trim().to_string())
    }
}

fn run_git(dir: &Path, args: &[&str]) -> TestResult<String> {
    let output = Command::new("git").args(args).current_dir(dir).output()?;
    if !output.status.success() {
        return Err(format!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        )
        .into());
    }
    Ok(String::from_utf8(output.stdout)?)
}
