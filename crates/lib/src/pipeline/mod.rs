//! Per-target pipelines and the one-time pre-pipeline.

mod pre;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::progress::{ProgressEvent, ProgressSender};
use crate::stage::{Stage, StageError};
use crate::target::Target;
use crate::toolchain::Toolchain;

pub use pre::{PreStage, PrePipelineError, run_pre_pipeline};

const BINARY_STAGES: &[Stage] = &[
  Stage::Prepare,
  Stage::Compile,
  Stage::StageIncludes,
  Stage::Compress,
  Stage::Cleanup,
];

const SOURCE_STAGES: &[Stage] = &[Stage::Prepare, Stage::SourceArchive, Stage::Cleanup];

/// A target's pipeline stopped at `stage`.
#[derive(Debug, Error)]
#[error("{target}: {stage} failed: {source}")]
pub struct PipelineError {
  /// Canonical name of the failed target.
  pub target: String,
  pub stage: Stage,
  #[source]
  pub source: StageError,
}

/// The fixed stage sequence for one target variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipeline {
  stages: &'static [Stage],
}

impl Pipeline {
  pub fn binary() -> Self {
    Self { stages: BINARY_STAGES }
  }

  pub fn source() -> Self {
    Self { stages: SOURCE_STAGES }
  }

  pub fn for_target(target: &Target) -> Self {
    if target.is_source() { Self::source() } else { Self::binary() }
  }

  pub fn stages(&self) -> &'static [Stage] {
    self.stages
  }

  /// Run every stage in order, stopping at the first failure.
  ///
  /// On failure the target's state is left exactly as the last successful
  /// stage left it; later stages (cleanup included) do not run.
  pub async fn run(
    &self,
    index: usize,
    target: &mut Target,
    toolchain: &Toolchain,
    progress: &ProgressSender,
  ) -> Result<(), PipelineError> {
    info!(target = %target, stages = self.stages.len(), "starting pipeline");
    progress.send(ProgressEvent::Started {
      index,
      label: target.label(),
      total: self.stages.len(),
    });

    for (done, stage) in self.stages.iter().enumerate() {
      debug!(target = %target, stage = %stage, "running stage");
      progress.send(ProgressEvent::StageStarted { index, stage: *stage });

      if let Err(source) = stage.run(target, toolchain).await {
        error!(target = %target, stage = %stage, error = %source, "stage failed");
        progress.send(ProgressEvent::Failed {
          index,
          stage: *stage,
          error: source.to_string(),
        });
        return Err(PipelineError {
          target: target.canonical_name(),
          stage: *stage,
          source,
        });
      }

      progress.send(ProgressEvent::StageFinished {
        index,
        stage: *stage,
        completed: done + 1,
      });
    }

    info!(target = %target, "pipeline finished");
    progress.send(ProgressEvent::Finished { index });
    Ok(())
  }
}
