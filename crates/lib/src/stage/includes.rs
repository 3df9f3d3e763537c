use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::stage::{Stage, StageError, require_scratch};
use crate::target::Target;

/// Copy every configured include path into the scratch directory.
///
/// Files land as `{scratch}/{name}`, directories as `{scratch}/{name}/...`.
pub async fn run(target: &Target) -> Result<(), StageError> {
  let scratch = require_scratch(target, Stage::StageIncludes)?;
  let includes = target.config().include.clone();
  if includes.is_empty() {
    return Ok(());
  }

  debug!(target = %target, count = includes.len(), "staging includes");
  tokio::task::spawn_blocking(move || copy_includes(&includes, &scratch))
    .await
    .map_err(|e| StageError::Join(e.to_string()))?
}

fn copy_includes(includes: &[PathBuf], dest: &Path) -> Result<(), StageError> {
  for include in includes {
    let name = include.file_name().ok_or_else(|| StageError::Filesystem {
      action: "resolve",
      path: include.clone(),
      source: std::io::Error::other("include path has no final component"),
    })?;
    copy_recursive(include, &dest.join(name))?;
  }
  Ok(())
}

fn copy_recursive(src: &Path, dst: &Path) -> Result<(), StageError> {
  let metadata = std::fs::metadata(src).map_err(StageError::fs("read", src))?;
  if !metadata.is_dir() {
    std::fs::copy(src, dst).map_err(StageError::fs("copy", src))?;
    return Ok(());
  }

  for entry in WalkDir::new(src).follow_links(true) {
    let entry = entry.map_err(|e| StageError::Filesystem {
      action: "walk",
      path: src.to_path_buf(),
      source: e.into(),
    })?;
    let relative = entry
      .path()
      .strip_prefix(src)
      .map_err(|e| StageError::fs("resolve", entry.path())(std::io::Error::other(e)))?;
    let target = dst.join(relative);

    if entry.file_type().is_dir() {
      std::fs::create_dir_all(&target).map_err(StageError::fs("create", &target))?;
    } else {
      std::fs::copy(entry.path(), &target).map_err(StageError::fs("copy", entry.path()))?;
    }
  }
  Ok(())
}
