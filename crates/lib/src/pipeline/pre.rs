use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::stage::StageError;
use crate::toolchain::Toolchain;

/// Steps run once against the config before any target pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreStage {
  /// Install (and optionally prune) vendored dependencies.
  Vendor,
}

impl PreStage {
  pub const ALL: &'static [PreStage] = &[PreStage::Vendor];

  pub fn name(&self) -> &'static str {
    match self {
      PreStage::Vendor => "vendor",
    }
  }

  pub async fn run(&self, config: &Config, toolchain: &Toolchain) -> Result<(), StageError> {
    match self {
      PreStage::Vendor => match &config.vendor {
        Some(settings) => toolchain.vendorer.vendor(settings, &config.root_dir).await,
        None => Ok(()),
      },
    }
  }
}

impl fmt::Display for PreStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

#[derive(Debug, Error)]
#[error("pre-pipeline stage {stage} failed: {source}")]
pub struct PrePipelineError {
  pub stage: PreStage,
  #[source]
  pub source: StageError,
}

/// Run every pre-pipeline stage, stopping at the first failure.
pub async fn run_pre_pipeline(config: &Config, toolchain: &Toolchain) -> Result<(), PrePipelineError> {
  for stage in PreStage::ALL {
    info!(stage = %stage, "running pre-pipeline stage");
    stage
      .run(config, toolchain)
      .await
      .map_err(|source| PrePipelineError { stage: *stage, source })?;
  }
  Ok(())
}
