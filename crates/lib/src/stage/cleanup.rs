use std::io::ErrorKind;

use tokio::fs;
use tracing::debug;

use crate::stage::{Stage, StageError};
use crate::target::Target;

/// Remove the scratch directory recorded by prepare.
///
/// Without a recorded directory this is a precondition error, so running
/// cleanup twice fails on the second call.
pub async fn run(target: &mut Target) -> Result<(), StageError> {
  let Some(scratch) = target.state.scratch_dir.clone() else {
    return Err(StageError::Precondition {
      stage: Stage::Cleanup,
      missing: "a recorded scratch directory (prepare must run first)",
    });
  };

  match fs::remove_dir_all(&scratch).await {
    Ok(()) => debug!(target = %target, dir = %scratch.display(), "scratch directory removed"),
    Err(e) if e.kind() == ErrorKind::NotFound => {
      debug!(target = %target, dir = %scratch.display(), "scratch directory already gone")
    }
    Err(e) => return Err(StageError::fs("remove", &scratch)(e)),
  }

  target.state.scratch_dir = None;
  Ok(())
}
