//! Build targets.
//!
//! A [`Target`] is one cell of the build matrix: a (platform, arch) pair or the
//! special source-archive cell. Its identity is immutable; the only mutable part
//! is [`TargetState`], which stages use to hand results to later stages.

mod matrix;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::consts::SOURCE_SUFFIX;
use crate::platform::OsFamily;

pub use matrix::{expand_matrix, plan_release, validate_targets};

/// What a target produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetKind {
  /// A compiled binary for one platform/arch pair.
  Binary { platform: String, arch: String },
  /// An archive of the project's sources.
  Source,
}

/// State handed forward between the stages of one target's pipeline.
///
/// Owned by exactly one [`Target`]; no other target can observe it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetState {
  /// Scratch directory, recorded by the prepare stage and cleared by cleanup.
  pub scratch_dir: Option<PathBuf>,
  /// Finished archive, recorded by compress or source-archive.
  pub artifact: Option<PathBuf>,
}

/// One cell of the build matrix bound to the shared config.
#[derive(Debug)]
pub struct Target {
  kind: TargetKind,
  config: Arc<Config>,
  pub state: TargetState,
}

impl Target {
  pub fn binary(config: Arc<Config>, platform: impl Into<String>, arch: impl Into<String>) -> Self {
    Self {
      kind: TargetKind::Binary {
        platform: platform.into(),
        arch: arch.into(),
      },
      config,
      state: TargetState::default(),
    }
  }

  pub fn source(config: Arc<Config>) -> Self {
    Self {
      kind: TargetKind::Source,
      config,
      state: TargetState::default(),
    }
  }

  pub fn kind(&self) -> &TargetKind {
    &self.kind
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn is_source(&self) -> bool {
    matches!(self.kind, TargetKind::Source)
  }

  /// Platform and arch of a binary target, `None` for the source target.
  pub fn platform_arch(&self) -> Option<(&str, &str)> {
    match &self.kind {
      TargetKind::Binary { platform, arch } => Some((platform, arch)),
      TargetKind::Source => None,
    }
  }

  /// OS family of a binary target, `None` for the source target.
  pub fn os_family(&self) -> Option<OsFamily> {
    self.platform_arch().map(|(platform, _)| OsFamily::of(platform))
  }

  /// Deterministic artifact identifier.
  ///
  /// `{project}_{version}_{platform}_{arch}` for binaries,
  /// `{project}_{version}_src` for the source archive.
  pub fn canonical_name(&self) -> String {
    let prefix = format!("{}_{}", self.config.name, self.config.version);
    match &self.kind {
      TargetKind::Binary { platform, arch } => format!("{}_{}_{}", prefix, platform, arch),
      TargetKind::Source => format!("{}_{}", prefix, SOURCE_SUFFIX),
    }
  }

  /// Short label for progress display ("linux/amd64" or "src").
  pub fn label(&self) -> String {
    match &self.kind {
      TargetKind::Binary { platform, arch } => format!("{}/{}", platform, arch),
      TargetKind::Source => SOURCE_SUFFIX.to_string(),
    }
  }

  /// Where the prepare stage puts this target's scratch directory.
  pub fn scratch_path(&self) -> PathBuf {
    self.config.output_dir.join(self.canonical_name())
  }

  /// Path of the final artifact with the given extension (e.g. "tar.gz").
  pub fn artifact_path(&self, extension: &str) -> PathBuf {
    self
      .config
      .output_dir
      .join(format!("{}.{}", self.canonical_name(), extension))
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.canonical_name())
  }
}
