use std::collections::HashSet;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::stage::{Stage, StageError, require_scratch};
use crate::target::Target;
use crate::toolchain::{SourceLister, archive_files};

/// Archive tracked and vendored files into `{output-dir}/{canonical}.tar.gz`.
pub async fn run(target: &mut Target, sources: &dyn SourceLister) -> Result<(), StageError> {
  require_scratch(target, Stage::SourceArchive)?;
  let config = target.config();
  let root = config.root_dir.clone();
  let vendor_dir = config.vendor_dir.clone();

  let mut files = sources.tracked_files(&root).await?;
  let vendored = {
    let (root, vendor_dir) = (root.clone(), vendor_dir.clone());
    tokio::task::spawn_blocking(move || vendored_files(&root, &vendor_dir))
      .await
      .map_err(|e| StageError::Join(e.to_string()))??
  };
  debug!(tracked = files.len(), vendored = vendored.len(), "collected source files");
  files.extend(vendored);
  let files = dedup_files(files);

  let root_name = target.canonical_name();
  let dest = target.artifact_path("tar.gz");
  info!(target = %target, files = files.len(), "archiving sources");
  archive_files(&root, files, &root_name, &dest).await?;

  target.state.artifact = Some(dest);
  Ok(())
}

/// Regular files under `vendor_dir`, as paths relative to `root`.
///
/// `.git` directories are skipped. A missing vendor directory yields nothing.
pub fn vendored_files(root: &Path, vendor_dir: &Path) -> Result<Vec<PathBuf>, StageError> {
  if !vendor_dir.is_dir() {
    return Ok(Vec::new());
  }

  let walker = WalkDir::new(vendor_dir)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == ".git"));

  let mut files = Vec::new();
  for entry in walker {
    let entry = entry.map_err(|e| StageError::Filesystem {
      action: "walk",
      path: vendor_dir.to_path_buf(),
      source: e.into(),
    })?;
    if !entry.file_type().is_file() {
      continue;
    }
    let relative = entry
      .path()
      .strip_prefix(root)
      .map_err(|e| StageError::fs("resolve", entry.path())(std::io::Error::other(e)))?;
    files.push(relative.to_path_buf());
  }
  Ok(files)
}

/// Drop repeated paths, keeping the first occurrence and the input order.
pub fn dedup_files<T: Eq + Hash + Clone>(files: Vec<T>) -> Vec<T> {
  let mut seen = HashSet::new();
  files.into_iter().filter(|f| seen.insert(f.clone())).collect()
}
