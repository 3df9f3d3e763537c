//! Pipeline stages.
//!
//! A [`Stage`] is one step applied to a [`Target`]. Stages only talk to each
//! other through [`TargetState`](crate::target::TargetState): prepare records
//! the scratch directory, compress/source-archive record the artifact, cleanup
//! clears the scratch directory again.

mod cleanup;
mod compile;
mod compress;
mod includes;
mod prepare;
mod source;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::target::Target;
use crate::toolchain::{ProcessError, Toolchain};

pub use compile::injected_symbols;
pub use source::{dedup_files, vendored_files};

/// The steps a target's pipeline is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
  /// Create the scratch directory.
  Prepare,
  /// Build every entry point into the scratch directory.
  Compile,
  /// Copy include paths into the scratch directory.
  StageIncludes,
  /// Pack the scratch directory into the artifact.
  Compress,
  /// Archive tracked and vendored sources.
  SourceArchive,
  /// Remove the scratch directory.
  Cleanup,
}

impl Stage {
  pub fn name(&self) -> &'static str {
    match self {
      Stage::Prepare => "prepare",
      Stage::Compile => "compile",
      Stage::StageIncludes => "stage-includes",
      Stage::Compress => "compress",
      Stage::SourceArchive => "source-archive",
      Stage::Cleanup => "cleanup",
    }
  }

  /// Run this stage against `target`.
  pub async fn run(&self, target: &mut Target, toolchain: &Toolchain) -> Result<(), StageError> {
    match self {
      Stage::Prepare => prepare::run(target).await,
      Stage::Compile => compile::run(target, toolchain.compiler.as_ref()).await,
      Stage::StageIncludes => includes::run(target).await,
      Stage::Compress => compress::run(target).await,
      Stage::SourceArchive => source::run(target, toolchain.sources.as_ref()).await,
      Stage::Cleanup => cleanup::run(target).await,
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

/// Why a stage failed.
#[derive(Debug, Error)]
pub enum StageError {
  /// The stage ran before a stage it depends on.
  #[error("{stage} requires {missing}")]
  Precondition { stage: Stage, missing: &'static str },

  /// An external tool failed.
  #[error(transparent)]
  Process(#[from] ProcessError),

  #[error("failed to {action} {path}: {source}")]
  Filesystem {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to write archive {path}: {message}")]
  Archive { path: PathBuf, message: String },

  #[error("cannot derive a binary name from entry point {0:?}")]
  EntryPoint(String),

  /// Two entry points would write the same file into the scratch directory.
  #[error("entry points {first:?} and {second:?} both build a binary named {name:?}")]
  BinaryCollision { name: String, first: String, second: String },

  #[error("background task failed: {0}")]
  Join(String),
}

impl StageError {
  /// Build a mapper from `io::Error` for use with `map_err`.
  pub fn fs(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> Self {
    let path = path.to_path_buf();
    move |source| StageError::Filesystem { action, path, source }
  }

  /// Captured output of the failed external command, if any.
  pub fn output(&self) -> Option<&str> {
    match self {
      StageError::Process(e) => e.output(),
      _ => None,
    }
  }
}

/// The scratch directory recorded by prepare, which must still exist.
fn require_scratch(target: &Target, stage: Stage) -> Result<PathBuf, StageError> {
  match &target.state.scratch_dir {
    Some(dir) if dir.is_dir() => Ok(dir.clone()),
    _ => Err(StageError::Precondition {
      stage,
      missing: "an existing scratch directory (prepare must run first)",
    }),
  }
}
