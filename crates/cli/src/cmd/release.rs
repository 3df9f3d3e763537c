//! `relego`: run a full release.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::warn;

use relego_lib::release::{ReleaseOptions, ReleaseReport, run_release};
use relego_lib::{Toolchain, progress};

use super::ReleaseArgs;
use crate::output::{
  format_duration, print_error, print_info, print_json, print_output, print_stat, print_success, print_warning,
};
use crate::progress::render_progress;

/// Run the release described by `args`. Returns whether every target succeeded.
pub fn cmd_release(args: &ReleaseArgs) -> Result<bool> {
  let config = Arc::new(args.load()?);
  let toolchain = Toolchain::from_config(&config);
  let options = ReleaseOptions::from_config(&config);

  if !args.output.is_json() {
    print_info(&format!("Releasing {} {}", config.name, config.version));
  }

  let started = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let show_bars = !args.verbose && !args.output.is_json();

  let result = rt.block_on(async {
    let (tx, rx) = progress::channel();
    let renderer = tokio::spawn(render_progress(rx, show_bars));
    let result = run_release(config.clone(), &toolchain, &options, &tx).await;
    drop(tx);
    wait_for_renderer(renderer).await;
    result
  });

  let report = match result {
    Ok(report) => report,
    Err(e) => {
      if let Some(output) = e.output() {
        print_output(output);
      }
      return Err(e).context("Release aborted");
    }
  };

  if args.output.is_json() {
    print_json(&report)?;
  } else {
    print_report(&report, started);
  }
  Ok(report.is_success())
}

/// The report is printed either way; a broken renderer only costs the bars.
async fn wait_for_renderer(renderer: JoinHandle<()>) {
  if let Err(e) = renderer.await {
    warn!(error = %e, "progress renderer stopped unexpectedly");
  }
}

fn print_report(report: &ReleaseReport, started: Instant) {
  println!();
  for artifact in &report.artifacts {
    print_stat(&artifact.target, &artifact.path.display().to_string());
  }

  for failure in &report.failures {
    let stage = failure.stage.map(|s| s.to_string()).unwrap_or_else(|| "pipeline".into());
    print_error(&format!("{}: {} failed: {}", failure.target, stage, failure.error));
    if let Some(output) = &failure.output {
      print_output(output);
    }
  }

  for skipped in &report.skipped {
    print_warning(&format!("{}: skipped after an earlier failure", skipped));
  }

  println!();
  let elapsed = format_duration(started.elapsed());
  if report.is_success() {
    print_success(&format!(
      "Released {} artifact(s) for {} {} in {}",
      report.artifacts.len(),
      report.name,
      report.version,
      elapsed
    ));
  } else {
    print_error(&format!(
      "Release failed: {} of {} target(s) failed, {} skipped ({})",
      report.failures.len(),
      report.total(),
      report.skipped.len(),
      elapsed
    ));
  }
}
