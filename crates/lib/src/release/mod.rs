//! The release orchestrator.
//!
//! [`run_release`] plans the target matrix, runs the pre-pipeline once, then
//! announces every target in plan order and runs each target's pipeline as
//! its own tokio task:
//! - a [`Semaphore`] caps how many pipelines run at once
//! - once any pipeline fails, targets still waiting for a slot are skipped
//! - pipelines that already started always run to completion

pub mod types;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::pipeline::{Pipeline, PipelineError, run_pre_pipeline};
use crate::progress::{ProgressEvent, ProgressSender};
use crate::target::{Target, plan_release};
use crate::toolchain::Toolchain;

pub use types::{Artifact, ReleaseError, ReleaseOptions, ReleaseReport, TargetFailure};

enum Outcome {
  Built(Artifact),
  Failed(TargetFailure),
  Skipped(String),
}

/// Build, package and clean up every target in the config's matrix.
///
/// Config and pre-pipeline errors abort the whole run. Pipeline failures do
/// not; they are collected in the returned report.
pub async fn run_release(
  config: Arc<Config>,
  toolchain: &Toolchain,
  options: &ReleaseOptions,
  progress: &ProgressSender,
) -> Result<ReleaseReport, ReleaseError> {
  let targets = plan_release(&config)?;
  info!(
    name = %config.name,
    version = %config.version,
    targets = targets.len(),
    "starting release"
  );

  run_pre_pipeline(&config, toolchain).await?;

  let permits = options.parallelism.unwrap_or(targets.len()).max(1);
  let semaphore = Arc::new(Semaphore::new(permits));
  let aborted = Arc::new(AtomicBool::new(false));

  for (index, target) in targets.iter().enumerate() {
    progress.send(ProgressEvent::Queued {
      index,
      label: target.label(),
      total: Pipeline::for_target(target).stages().len(),
    });
  }

  let mut join_set = JoinSet::new();
  let mut names = HashMap::new();

  for (index, target) in targets.into_iter().enumerate() {
    let name = target.canonical_name();
    let toolchain = toolchain.clone();
    let progress = progress.clone();
    let semaphore = semaphore.clone();
    let aborted = aborted.clone();

    let handle = join_set.spawn(async move {
      let outcome = run_target(index, target, &toolchain, &progress, &semaphore, &aborted).await;
      (index, outcome)
    });
    names.insert(handle.id(), (index, name));
  }

  let mut outcomes = Vec::with_capacity(names.len());
  while let Some(joined) = join_set.join_next_with_id().await {
    match joined {
      Ok((_, result)) => outcomes.push(result),
      Err(e) => {
        error!(error = %e, "pipeline task panicked");
        aborted.store(true, Ordering::SeqCst);
        if let Some((index, name)) = names.remove(&e.id()) {
          outcomes.push((
            index,
            Outcome::Failed(TargetFailure {
              target: name,
              stage: None,
              error: format!("pipeline task failed: {}", e),
              output: None,
            }),
          ));
        }
      }
    }
  }
  outcomes.sort_by_key(|(index, _)| *index);

  let mut report = ReleaseReport {
    name: config.name.clone(),
    version: config.version.clone(),
    build_date: config.build_date_rfc3339(),
    ..Default::default()
  };
  for (_, outcome) in outcomes {
    match outcome {
      Outcome::Built(artifact) => report.artifacts.push(artifact),
      Outcome::Failed(failure) => report.failures.push(failure),
      Outcome::Skipped(name) => report.skipped.push(name),
    }
  }

  info!(
    artifacts = report.artifacts.len(),
    failed = report.failures.len(),
    skipped = report.skipped.len(),
    "release complete"
  );
  Ok(report)
}

async fn run_target(
  index: usize,
  mut target: Target,
  toolchain: &Toolchain,
  progress: &ProgressSender,
  semaphore: &Semaphore,
  aborted: &AtomicBool,
) -> Outcome {
  let skip = |target: &Target| {
    warn!(target = %target, "skipping target after an earlier failure");
    progress.send(ProgressEvent::Skipped {
      index,
      label: target.label(),
    });
    Outcome::Skipped(target.canonical_name())
  };

  let Ok(_permit) = semaphore.acquire().await else {
    return skip(&target);
  };
  if aborted.load(Ordering::SeqCst) {
    return skip(&target);
  }

  match Pipeline::for_target(&target).run(index, &mut target, toolchain, progress).await {
    Ok(()) => match target.state.artifact.take() {
      Some(path) => Outcome::Built(Artifact {
        target: target.canonical_name(),
        path,
      }),
      None => Outcome::Failed(TargetFailure {
        target: target.canonical_name(),
        stage: None,
        error: "pipeline finished without recording an artifact".into(),
        output: None,
      }),
    },
    Err(e) => {
      aborted.store(true, Ordering::SeqCst);
      Outcome::Failed(failure(e))
    }
  }
}

fn failure(e: PipelineError) -> TargetFailure {
  TargetFailure {
    output: e.source.output().map(str::to_string),
    error: e.source.to_string(),
    stage: Some(e.stage),
    target: e.target,
  }
}
