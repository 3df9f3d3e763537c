//! Configuration types.
//!
//! [`RawConfig`] mirrors the YAML file as written by the user. [`Config`] is the
//! resolved, defaulted form shared read-only by every target of a run.

use std::path::PathBuf;

use chrono::{DateTime, Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::SOURCE_PLATFORMS;

/// Errors raised while loading or validating configuration.
///
/// Every variant is fatal: no stage runs once one of these is returned.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("failed to resolve project root of {path}: {source}")]
  Root {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to resolve the working directory: {0}")]
  WorkingDir(#[source] std::io::Error),

  #[error("cannot derive a project name from {0}; set `name` in the config")]
  ProjectName(PathBuf),

  #[error("failed to expand outputDir {value:?}: {message}")]
  OutputDir { value: String, message: String },

  #[error("vendorDir {path} is outside the project root {root}")]
  VendorDir { path: PathBuf, root: PathBuf },

  #[error("matrix entry {index} has an empty platform")]
  EmptyPlatform { index: usize },

  #[error("duplicate target {name}: two matrix cells would write the same artifact")]
  DuplicateTarget { name: String },
}

/// The config file as deserialized, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub matrix: Vec<MatrixEntry>,
  #[serde(default)]
  pub mains: Vec<String>,
  #[serde(default)]
  pub include: Vec<String>,
  #[serde(default)]
  pub output_dir: Option<String>,
  #[serde(default)]
  pub ld: Option<LdConfig>,
  #[serde(default, alias = "glide")]
  pub vendor: Option<VendorConfig>,
  #[serde(default)]
  pub vendor_dir: Option<String>,
  #[serde(default)]
  pub go: Option<String>,
  #[serde(default)]
  pub jobs: Option<usize>,
}

/// One row of the build matrix: a platform and the architectures to build for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixEntry {
  #[serde(alias = "os")]
  pub platform: String,
  #[serde(default)]
  pub arch: Vec<String>,
}

impl MatrixEntry {
  pub fn new(platform: impl Into<String>, arch: &[&str]) -> Self {
    Self {
      platform: platform.into(),
      arch: arch.iter().map(|a| a.to_string()).collect(),
    }
  }

  /// A source-archive request rather than a binary build.
  pub fn is_source(&self) -> bool {
    SOURCE_PLATFORMS.iter().any(|p| self.platform.eq_ignore_ascii_case(p))
  }
}

/// Linker symbols that receive the release version and build date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdConfig {
  #[serde(default)]
  pub version_path: Option<String>,
  #[serde(default)]
  pub build_date_path: Option<String>,
}

impl LdConfig {
  pub fn is_empty(&self) -> bool {
    self.version_path.as_deref().is_none_or(str::is_empty) && self.build_date_path.as_deref().is_none_or(str::is_empty)
  }
}

/// Dependency vendoring settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorConfig {
  /// Vendoring tool binary (default `glide`).
  #[serde(default)]
  pub path: Option<String>,
  /// Run the pruning pass after installing.
  #[serde(default, alias = "glideVC")]
  pub prune: bool,
  /// Pruning tool binary (default `glide-vc`).
  #[serde(default, alias = "glideVCPath")]
  pub prune_path: Option<String>,
}

/// Resolved configuration for one invocation.
///
/// Built once at startup and shared behind an `Arc` by every target; nothing
/// mutates it afterwards, so all targets see the same version and build date.
#[derive(Debug, Clone)]
pub struct Config {
  pub name: String,
  pub version: String,
  pub build_date: DateTime<Local>,
  pub matrix: Vec<MatrixEntry>,
  pub mains: Vec<String>,
  pub include: Vec<PathBuf>,
  pub output_dir: PathBuf,
  pub ld: Option<LdConfig>,
  pub vendor: Option<VendorConfig>,
  pub vendor_dir: PathBuf,
  pub go: String,
  pub jobs: Option<usize>,
  /// Directory holding the config file; external commands run here.
  pub root_dir: PathBuf,
}

impl Config {
  /// Build date as an RFC 3339 timestamp, the form injected into binaries.
  pub fn build_date_rfc3339(&self) -> String {
    self.build_date.to_rfc3339_opts(SecondsFormat::Secs, false)
  }
}
