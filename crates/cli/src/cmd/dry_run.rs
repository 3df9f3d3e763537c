//! `relego --dry-run`: show what a release would build.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use relego_lib::pipeline::Pipeline;
use relego_lib::stage::Stage;
use relego_lib::target::plan_release;

use super::ReleaseArgs;
use crate::output::{print_info, print_json, print_stat, symbols};

#[derive(Serialize)]
struct PlannedTarget {
  target: String,
  stages: Vec<Stage>,
}

#[derive(Serialize)]
struct Plan {
  name: String,
  version: String,
  output_dir: String,
  targets: Vec<PlannedTarget>,
}

pub fn cmd_dry_run(args: &ReleaseArgs) -> Result<()> {
  let config = Arc::new(args.load()?);
  let targets = plan_release(&config)?;

  let plan = Plan {
    name: config.name.clone(),
    version: config.version.clone(),
    output_dir: config.output_dir.display().to_string(),
    targets: targets
      .iter()
      .map(|t| PlannedTarget {
        target: t.canonical_name(),
        stages: Pipeline::for_target(t).stages().to_vec(),
      })
      .collect(),
  };

  if args.output.is_json() {
    return print_json(&plan);
  }

  print_info(&format!("Dry run: {} {}", plan.name, plan.version));
  print_stat("Output", &plan.output_dir);
  print_stat("Targets", &plan.targets.len().to_string());
  println!();
  for target in &plan.targets {
    let stages: Vec<&str> = target.stages.iter().map(Stage::name).collect();
    println!("  {} {}", symbols::INFO, target.target);
    println!("      {}", stages.join(&format!(" {} ", symbols::ARROW)));
  }
  Ok(())
}
