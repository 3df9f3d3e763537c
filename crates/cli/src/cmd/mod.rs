mod dry_run;
mod release;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use relego_lib::{Config, LoadOptions, load_config};

use crate::output::OutputFormat;

pub use dry_run::cmd_dry_run;
pub use release::cmd_release;

/// Command-line inputs shared by the release and dry-run paths.
#[derive(Debug, Clone)]
pub struct ReleaseArgs {
  pub config: PathBuf,
  pub version: Option<String>,
  pub jobs: Option<usize>,
  pub output: OutputFormat,
  pub verbose: bool,
}

impl ReleaseArgs {
  fn load(&self) -> Result<Config> {
    let options = LoadOptions {
      version_override: self.version.clone(),
      build_date: None,
      jobs_override: self.jobs,
      working_dir: None,
    };
    let config = load_config(&self.config, &options)
      .with_context(|| format!("Failed to load config: {}", self.config.display()))?;
    debug!(
      name = %config.name,
      version = %config.version,
      root = %config.root_dir.display(),
      "loaded config"
    );
    Ok(config)
  }
}
