//! Options, results and errors of a release run.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::pipeline::{PreStage, PrePipelineError};
use crate::stage::{Stage, StageError};

/// Knobs for [`run_release`](super::run_release) that are not part of the config.
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
  /// Maximum number of target pipelines running at once. `None` runs them all
  /// concurrently.
  pub parallelism: Option<usize>,
}

impl ReleaseOptions {
  pub fn from_config(config: &Config) -> Self {
    Self {
      parallelism: config.jobs,
    }
  }
}

/// A finished archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
  pub target: String,
  pub path: PathBuf,
}

/// A target whose pipeline stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailure {
  pub target: String,
  /// Stage that failed; `None` if the pipeline task itself died.
  pub stage: Option<Stage>,
  pub error: String,
  /// Combined stdout/stderr of the failed command, if one ran.
  pub output: Option<String>,
}

/// Outcome of a release run, in matrix order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseReport {
  pub name: String,
  pub version: String,
  pub build_date: String,
  pub artifacts: Vec<Artifact>,
  pub failures: Vec<TargetFailure>,
  /// Targets that never started because another target had already failed.
  pub skipped: Vec<String>,
}

impl ReleaseReport {
  pub fn is_success(&self) -> bool {
    self.failures.is_empty() && self.skipped.is_empty()
  }

  /// Total number of planned targets.
  pub fn total(&self) -> usize {
    self.artifacts.len() + self.failures.len() + self.skipped.len()
  }
}

/// Errors that stop a release before any target pipeline runs.
#[derive(Debug, Error)]
pub enum ReleaseError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("pre-pipeline stage {stage} failed: {source}")]
  PrePipeline {
    stage: PreStage,
    #[source]
    source: StageError,
  },
}

impl From<PrePipelineError> for ReleaseError {
  fn from(e: PrePipelineError) -> Self {
    ReleaseError::PrePipeline {
      stage: e.stage,
      source: e.source,
    }
  }
}

impl ReleaseError {
  /// Captured output of the failed external command, if any.
  pub fn output(&self) -> Option<&str> {
    match self {
      ReleaseError::PrePipeline { source, .. } => source.output(),
      ReleaseError::Config(_) => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_report_is_success() {
    let report = ReleaseReport::default();
    assert!(report.is_success());
    assert_eq!(report.total(), 0);
  }

  #[test]
  fn skipped_targets_make_the_run_fail() {
    let report = ReleaseReport {
      skipped: vec!["tool_1.0.0_src".into()],
      ..Default::default()
    };
    assert!(!report.is_success());
    assert_eq!(report.total(), 1);
  }

  #[test]
  fn report_serializes_stage_names() {
    let report = ReleaseReport {
      failures: vec![TargetFailure {
        target: "tool_1.0.0_linux_amd64".into(),
        stage: Some(Stage::Compile),
        error: "boom".into(),
        output: None,
      }],
      ..Default::default()
    };
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["failures"][0]["stage"], "compile");
    assert!(json["failures"][0]["output"].is_null());
  }
}
