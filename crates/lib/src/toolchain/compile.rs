//! The compile capability.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::stage::StageError;
use crate::toolchain::process::run_captured;

/// A linker symbol to overwrite at build time (`-X path=value`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedSymbol {
  pub path: String,
  pub value: String,
}

/// Everything needed to build one entry point for one platform.
#[derive(Debug, Clone)]
pub struct CompileRequest {
  pub platform: String,
  pub arch: String,
  /// Package or path to build, as written in the config.
  pub entry: String,
  /// Where the binary must be written.
  pub output: PathBuf,
  pub symbols: Vec<InjectedSymbol>,
  /// Directory to build from.
  pub work_dir: PathBuf,
}

/// Turns an entry point into a binary for a (platform, arch) pair.
#[async_trait]
pub trait Compiler: Send + Sync {
  async fn compile(&self, request: &CompileRequest) -> Result<(), StageError>;
}

/// Cross-compiles with `go build`, selecting the target through `GOOS`/`GOARCH`.
#[derive(Debug, Clone)]
pub struct GoCompiler {
  go: String,
}

impl GoCompiler {
  pub fn new(go: impl Into<String>) -> Self {
    Self { go: go.into() }
  }

  fn command(&self, request: &CompileRequest) -> Command {
    let mut command = Command::new(&self.go);
    command
      .arg("build")
      .arg("-o")
      .arg(&request.output)
      .current_dir(&request.work_dir)
      .env("GOOS", &request.platform)
      .env("GOARCH", &request.arch);

    if !request.symbols.is_empty() {
      command.arg("-ldflags").arg(ldflags(&request.symbols));
    }

    command.arg(&request.entry);
    command
  }
}

#[async_trait]
impl Compiler for GoCompiler {
  async fn compile(&self, request: &CompileRequest) -> Result<(), StageError> {
    info!(
      entry = %request.entry,
      platform = %request.platform,
      arch = %request.arch,
      "compiling"
    );
    run_captured(&mut self.command(request)).await?;
    Ok(())
  }
}

/// Render injected symbols as a `-ldflags` value.
pub fn ldflags(symbols: &[InjectedSymbol]) -> String {
  symbols
    .iter()
    .map(|s| format!("-X {}={}", s.path, s.value))
    .collect::<Vec<_>>()
    .join(" ")
}

/// Name of the binary built from `entry`.
///
/// Local entries (`.`, `./cmd/x`, `../x`) are resolved against `root` so that
/// `.` is named after the project directory; import paths use their last
/// segment.
pub fn binary_name(entry: &str, root: &Path) -> Option<String> {
  if is_local(entry) {
    let resolved = normalize(&root.join(entry));
    return resolved.file_name().and_then(|n| n.to_str()).map(str::to_string);
  }
  entry
    .trim_end_matches('/')
    .rsplit('/')
    .next()
    .filter(|s| !s.is_empty())
    .map(str::to_string)
}

fn is_local(entry: &str) -> bool {
  entry == "." || entry == ".." || entry.starts_with("./") || entry.starts_with("../")
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
  use std::path::Component;

  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        out.pop();
      }
      other => out.push(other),
    }
  }
  out
}
