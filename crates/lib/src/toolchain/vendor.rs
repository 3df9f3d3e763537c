//! The dependency vendoring capability.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::config::VendorConfig;
use crate::consts::{DEFAULT_GLIDE, DEFAULT_GLIDE_VC};
use crate::stage::StageError;
use crate::toolchain::process::run_captured;

/// Installs (and optionally prunes) vendored dependencies.
#[async_trait]
pub trait Vendorer: Send + Sync {
  async fn vendor(&self, settings: &VendorConfig, root: &Path) -> Result<(), StageError>;
}

/// Vendors with `glide install`, pruning with `glide-vc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlideVendorer;

pub const INSTALL_ARGS: &[&str] = &["install", "--strip-vcs", "--strip-vendor", "--update-vendored", "--delete"];
pub const PRUNE_ARGS: &[&str] = &["--only-code", "--no-tests"];

#[async_trait]
impl Vendorer for GlideVendorer {
  async fn vendor(&self, settings: &VendorConfig, root: &Path) -> Result<(), StageError> {
    let tool = settings.path.as_deref().filter(|p| !p.is_empty()).unwrap_or(DEFAULT_GLIDE);
    info!(tool = %tool, "installing vendored dependencies");

    let mut install = Command::new(tool);
    install.args(INSTALL_ARGS).current_dir(root);
    run_captured(&mut install).await?;

    if settings.prune {
      let pruner = settings
        .prune_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_GLIDE_VC);
      info!(tool = %pruner, "pruning vendored dependencies");

      let mut prune = Command::new(pruner);
      prune.args(PRUNE_ARGS).current_dir(root);
      run_captured(&mut prune).await?;
    }

    Ok(())
  }
}
