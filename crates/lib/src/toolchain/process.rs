//! External process execution.
//!
//! Every external tool (compiler, vcs, vendoring) goes through
//! [`run_captured`], which waits for the process, captures its output and
//! turns a non-zero exit into a [`ProcessError`] carrying that output.

use std::process::Output;

use tokio::process::Command;
use tracing::debug;

use thiserror::Error;

/// A spawned command that could not be run or did not succeed.
#[derive(Debug, Error)]
pub enum ProcessError {
  #[error("failed to spawn `{command}`: {source}")]
  Spawn {
    command: String,
    #[source]
    source: std::io::Error,
  },

  #[error("`{command}` exited with {}", exit_status(.code))]
  Failed {
    command: String,
    code: Option<i32>,
    /// Combined stdout and stderr of the process.
    output: String,
  },
}

impl ProcessError {
  /// Captured output of a failed process.
  pub fn output(&self) -> Option<&str> {
    match self {
      ProcessError::Failed { output, .. } => Some(output),
      ProcessError::Spawn { .. } => None,
    }
  }
}

/// Output of a successful process.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
  pub stdout: String,
  pub stderr: String,
}

impl CapturedOutput {
  /// Stdout followed by stderr.
  pub fn combined(&self) -> String {
    combine(&self.stdout, &self.stderr)
  }
}

/// Render a command as a shell-like string for messages.
pub fn describe(command: &Command) -> String {
  let std = command.as_std();
  std::iter::once(std.get_program())
    .chain(std.get_args())
    .map(|part| part.to_string_lossy().into_owned())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Run `command` to completion and capture its output as text.
pub async fn run_captured(command: &mut Command) -> Result<CapturedOutput, ProcessError> {
  let output = run_raw(command).await?;
  Ok(CapturedOutput {
    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
  })
}

/// Run `command` to completion and return its output bytes untouched.
///
/// Only a failure's output is decoded, for the error message.
pub async fn run_raw(command: &mut Command) -> Result<Output, ProcessError> {
  let line = describe(command);
  debug!(cmd = %line, "spawning process");

  let output = command.output().await.map_err(|source| ProcessError::Spawn {
    command: line.clone(),
    source,
  })?;

  if !output.status.success() {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command stdout");
    }
    return Err(ProcessError::Failed {
      command: line,
      code: output.status.code(),
      output: combine(&stdout, &stderr),
    });
  }

  Ok(output)
}

fn exit_status(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("code {}", code),
    None => "no exit code (killed by a signal)".to_string(),
  }
}

fn combine(stdout: &str, stderr: &str) -> String {
  match (stdout.is_empty(), stderr.is_empty()) {
    (true, _) => stderr.to_string(),
    (_, true) => stdout.to_string(),
    _ if stdout.ends_with('\n') => format!("{}{}", stdout, stderr),
    _ => format!("{}\n{}", stdout, stderr),
  }
}
