//! The version-control listing capability.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::stage::StageError;
use crate::toolchain::process::run_raw;

/// Lists the files tracked by version control, relative to the project root.
#[async_trait]
pub trait SourceLister: Send + Sync {
  async fn tracked_files(&self, root: &Path) -> Result<Vec<PathBuf>, StageError>;
}

/// Lists the git index with `git ls-files`.
#[derive(Debug, Clone)]
pub struct GitLsFiles {
  git: String,
}

impl GitLsFiles {
  pub fn new(git: impl Into<String>) -> Self {
    Self { git: git.into() }
  }
}

impl Default for GitLsFiles {
  fn default() -> Self {
    Self::new("git")
  }
}

#[async_trait]
impl SourceLister for GitLsFiles {
  async fn tracked_files(&self, root: &Path) -> Result<Vec<PathBuf>, StageError> {
    let mut command = Command::new(&self.git);
    command.args(["ls-files", "-z"]).current_dir(root);

    let output = run_raw(&mut command).await?;
    let files: Vec<PathBuf> = output
      .stdout
      .split(|b| *b == 0)
      .filter(|f| !f.is_empty())
      .map(path_from_bytes)
      .collect();

    debug!(count = files.len(), "listed tracked files");
    Ok(files)
  }
}

/// File names are bytes on Unix; anything else gets git's UTF-8.
#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
  use std::os::unix::ffi::OsStrExt;
  PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
  PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}
