//! Matrix expansion.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{Config, ConfigError};
use crate::target::Target;

/// Flatten the config's build matrix into targets.
///
/// Order follows the matrix, architectures in declared order. A source entry
/// yields exactly one target whatever its arch list says. Duplicates are not
/// removed here; [`validate_targets`] rejects them.
pub fn expand_matrix(config: &Arc<Config>) -> Vec<Target> {
  let mut targets = Vec::new();

  for entry in &config.matrix {
    if entry.is_source() {
      targets.push(Target::source(Arc::clone(config)));
      continue;
    }

    if entry.arch.is_empty() {
      warn!(platform = %entry.platform, "matrix entry has no architectures, skipping");
    }

    for arch in &entry.arch {
      targets.push(Target::binary(Arc::clone(config), entry.platform.clone(), arch.clone()));
    }
  }

  debug!(count = targets.len(), "expanded build matrix");
  targets
}

/// Reject target lists in which two targets share a canonical name.
///
/// Two such targets would share a scratch directory and overwrite each other's
/// artifact.
pub fn validate_targets(targets: &[Target]) -> Result<(), ConfigError> {
  let mut seen = HashSet::new();
  for target in targets {
    let name = target.canonical_name();
    if !seen.insert(name.clone()) {
      return Err(ConfigError::DuplicateTarget { name });
    }
  }
  Ok(())
}

/// Expand the matrix and validate it; the target list a release run will use.
pub fn plan_release(config: &Arc<Config>) -> Result<Vec<Target>, ConfigError> {
  let targets = expand_matrix(config);
  validate_targets(&targets)?;
  Ok(targets)
}
