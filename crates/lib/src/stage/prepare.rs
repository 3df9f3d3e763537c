use tokio::fs;
use tracing::debug;

use crate::stage::StageError;
use crate::target::Target;

/// Create `{output-dir}/{canonical-name}` and record it as the scratch directory.
///
/// An existing directory is reused as is.
pub async fn run(target: &mut Target) -> Result<(), StageError> {
  let scratch = target.scratch_path();
  fs::create_dir_all(&scratch)
    .await
    .map_err(StageError::fs("create", &scratch))?;

  debug!(target = %target, dir = %scratch.display(), "scratch directory ready");
  target.state.scratch_dir = Some(scratch);
  Ok(())
}
