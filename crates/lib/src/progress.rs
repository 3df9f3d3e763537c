//! Progress events emitted while target pipelines run.
//!
//! Pipelines never draw anything themselves. They push [`ProgressEvent`]s into
//! an unbounded channel and a single consumer (the CLI's renderer) decides how
//! to show them.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::stage::Stage;

/// One step of progress for the target at `index` in the release plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
  /// Sent once per target, in plan order, before any pipeline starts.
  Queued { index: usize, label: String, total: usize },
  /// The target's pipeline acquired a slot and is about to run `total` stages.
  Started { index: usize, label: String, total: usize },
  StageStarted { index: usize, stage: Stage },
  /// `completed` stages of the pipeline have finished so far.
  StageFinished { index: usize, stage: Stage, completed: usize },
  /// Every stage succeeded.
  Finished { index: usize },
  Failed { index: usize, stage: Stage, error: String },
  /// The target never started because another target had already failed.
  Skipped { index: usize, label: String },
}

impl ProgressEvent {
  pub fn index(&self) -> usize {
    match self {
      ProgressEvent::Queued { index, .. }
      | ProgressEvent::Started { index, .. }
      | ProgressEvent::StageStarted { index, .. }
      | ProgressEvent::StageFinished { index, .. }
      | ProgressEvent::Finished { index }
      | ProgressEvent::Failed { index, .. }
      | ProgressEvent::Skipped { index, .. } => *index,
    }
  }
}

/// Sending half of the progress channel. Sends never block and never fail
/// loudly; a dropped receiver just means nobody is watching.
#[derive(Debug, Clone, Default)]
pub struct ProgressSender {
  tx: Option<UnboundedSender<ProgressEvent>>,
}

impl ProgressSender {
  /// A sender that drops every event.
  pub fn disabled() -> Self {
    Self::default()
  }

  pub fn send(&self, event: ProgressEvent) {
    if let Some(tx) = &self.tx {
      let _ = tx.send(event);
    }
  }
}

/// Create a connected sender/receiver pair.
pub fn channel() -> (ProgressSender, UnboundedReceiver<ProgressEvent>) {
  let (tx, rx) = mpsc::unbounded_channel();
  (ProgressSender { tx: Some(tx) }, rx)
}
