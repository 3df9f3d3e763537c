use tracing::debug;

use crate::stage::{Stage, StageError, require_scratch};
use crate::target::Target;
use crate::toolchain::ArchiveFormat;

/// Pack the scratch directory into `{output-dir}/{canonical}.{zip|tar.gz}`.
pub async fn run(target: &mut Target) -> Result<(), StageError> {
  let scratch = require_scratch(target, Stage::Compress)?;
  let Some((platform, _)) = target.platform_arch() else {
    return Err(StageError::Precondition {
      stage: Stage::Compress,
      missing: "a binary target",
    });
  };

  let format = ArchiveFormat::for_platform(platform);
  let dest = target.artifact_path(format.extension());
  let root_name = target.canonical_name();
  debug!(target = %target, format = format.extension(), "compressing");

  format.archiver().archive(&scratch, &root_name, &dest).await?;
  target.state.artifact = Some(dest);
  Ok(())
}
