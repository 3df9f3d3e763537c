use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use relego_lib::consts::DEFAULT_CONFIG_FILE;

mod cmd;
mod output;
mod progress;

use output::{OutputFormat, print_error};

/// relego - Cross-compile a Go project for a platform matrix and package the results
#[derive(Parser, Debug)]
#[command(name = "relego")]
#[command(author, about, long_about = None, disable_version_flag = true)]
struct Cli {
  /// Path to the release config file
  #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
  config: PathBuf,

  /// Release version (default: derived from the build time)
  #[arg(long)]
  version: Option<String>,

  /// Maximum number of targets built at once
  #[arg(short, long)]
  jobs: Option<usize>,

  /// Print the targets and their stages without running anything
  #[arg(long)]
  dry_run: bool,

  /// Format of the final report
  #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  /// Enable debug logging
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let args = cmd::ReleaseArgs {
    config: cli.config,
    version: cli.version,
    jobs: cli.jobs,
    output: cli.output,
    verbose: cli.verbose,
  };

  let result = if cli.dry_run {
    cmd::cmd_dry_run(&args).map(|_| true)
  } else {
    cmd::cmd_release(&args)
  };

  match result {
    Ok(true) => ExitCode::SUCCESS,
    Ok(false) => ExitCode::FAILURE,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
