//! Terminal rendering of release progress.
//!
//! The only consumer of the library's progress channel: one bar per target,
//! created in plan order when the target is queued and advanced as stages
//! finish.

use std::collections::HashMap;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::mpsc::UnboundedReceiver;

use relego_lib::progress::ProgressEvent;

use crate::output::symbols;

const TEMPLATE: &str = "{spinner:.green} {prefix:<20} [{bar:30.cyan/blue}] {pos}/{len} {msg}";

/// Drain `rx` until every sender is gone. With `visible` false the events are
/// consumed but nothing is drawn.
pub async fn render_progress(mut rx: UnboundedReceiver<ProgressEvent>, visible: bool) {
  let multi = if visible {
    MultiProgress::new()
  } else {
    MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
  };
  let style = ProgressStyle::default_bar()
    .template(TEMPLATE)
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");

  let mut bars: HashMap<usize, ProgressBar> = HashMap::new();
  let add_bar = |label: String, total: usize| {
    let bar = multi.add(ProgressBar::new(total as u64));
    bar.set_style(style.clone());
    bar.set_prefix(label);
    bar
  };

  while let Some(event) = rx.recv().await {
    match event {
      ProgressEvent::Queued { index, label, total } => {
        let bar = add_bar(label, total);
        bar.set_message("queued");
        bars.insert(index, bar);
      }
      ProgressEvent::Started { index, label, total } => {
        let bar = bars.entry(index).or_insert_with(|| add_bar(label, total));
        bar.set_message("starting");
      }
      ProgressEvent::StageStarted { index, stage } => {
        if let Some(bar) = bars.get(&index) {
          bar.set_message(stage.to_string());
        }
      }
      ProgressEvent::StageFinished { index, completed, .. } => {
        if let Some(bar) = bars.get(&index) {
          bar.set_position(completed as u64);
        }
      }
      ProgressEvent::Finished { index } => {
        if let Some(bar) = bars.get(&index) {
          bar.finish_with_message(symbols::SUCCESS);
        }
      }
      ProgressEvent::Failed { index, stage, .. } => {
        if let Some(bar) = bars.get(&index) {
          bar.abandon_with_message(format!("{} {}", symbols::ERROR, stage));
        }
      }
      ProgressEvent::Skipped { index, label } => {
        let bar = bars.entry(index).or_insert_with(|| add_bar(label, 0));
        bar.abandon_with_message(format!("{} skipped", symbols::WARNING));
      }
    }
  }
}
