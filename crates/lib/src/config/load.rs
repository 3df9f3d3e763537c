//! Config file loading and defaulting.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::config::types::{Config, ConfigError, MatrixEntry, RawConfig};
use crate::consts::{DEFAULT_GO, DEFAULT_VENDOR_DIR, VERSION_TIMESTAMP_FORMAT};
use crate::platform::HostPlatform;

/// Values supplied by the caller rather than the config file.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
  /// Release version from the command line. Empty or `None` falls back to a
  /// version derived from the build timestamp.
  pub version_override: Option<String>,
  /// Fixed build timestamp; `None` captures the current time once.
  pub build_date: Option<DateTime<Local>>,
  /// Concurrency cap from the command line, wins over `jobs` in the file.
  pub jobs_override: Option<usize>,
  /// Directory a relative or missing `outputDir` resolves against. `None`
  /// uses the process's current directory.
  pub working_dir: Option<PathBuf>,
}

/// Read, parse and default the config file at `path`.
pub fn load_config(path: &Path, options: &LoadOptions) -> Result<Config, ConfigError> {
  debug!(path = %path.display(), "reading config");
  let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  parse_config(&content, path, options)
}

/// Parse config `content` as if it had been read from `path`.
///
/// The directory containing `path` becomes the project root; it must exist.
pub fn parse_config(content: &str, path: &Path, options: &LoadOptions) -> Result<Config, ConfigError> {
  let raw: RawConfig = if content.trim().is_empty() {
    RawConfig::default()
  } else {
    serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?
  };

  let root_dir = project_root(path)?;
  resolve(raw, root_dir, options)
}

/// Apply defaults to a raw config.
pub fn resolve(raw: RawConfig, root_dir: PathBuf, options: &LoadOptions) -> Result<Config, ConfigError> {
  let mut matrix = raw.matrix;
  if matrix.is_empty() {
    let host = HostPlatform::detect();
    warn!(host = %host, "no build matrix provided, building for the host platform only");
    matrix.push(MatrixEntry::new(host.os, &[host.arch]));
  }
  if let Some(index) = matrix.iter().position(|entry| entry.platform.trim().is_empty()) {
    return Err(ConfigError::EmptyPlatform { index });
  }

  let mut mains = raw.mains;
  if mains.is_empty() {
    warn!("no entry points provided, building \".\"");
    mains.push(".".to_string());
  }

  let name = match raw.name.filter(|n| !n.trim().is_empty()) {
    Some(name) => name,
    None => {
      let name = root_dir
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::ProjectName(root_dir.clone()))?;
      info!(name = %name, "no project name provided, using the project directory name");
      name
    }
  };

  let build_date = options.build_date.unwrap_or_else(Local::now);
  let version = match options.version_override.as_deref().map(str::trim) {
    Some(v) if !v.is_empty() => v.to_string(),
    _ => build_date.format(VERSION_TIMESTAMP_FORMAT).to_string(),
  };

  let working_dir = match &options.working_dir {
    Some(dir) => dir.clone(),
    None => current_dir()?,
  };
  let output_dir = match raw.output_dir.as_deref().filter(|d| !d.is_empty()) {
    Some(dir) => working_dir.join(expand_path(dir)?),
    None => working_dir,
  };

  let include = raw.include.iter().map(|p| root_dir.join(p)).collect();
  let vendor_dir = root_dir.join(raw.vendor_dir.as_deref().unwrap_or(DEFAULT_VENDOR_DIR));
  if !is_within(&vendor_dir, &root_dir) {
    return Err(ConfigError::VendorDir {
      path: vendor_dir,
      root: root_dir,
    });
  }
  let go = raw.go.filter(|g| !g.is_empty()).unwrap_or_else(|| DEFAULT_GO.to_string());
  let jobs = options.jobs_override.or(raw.jobs).filter(|j| *j > 0);
  let ld = raw.ld.filter(|ld| !ld.is_empty());

  Ok(Config {
    name,
    version,
    build_date,
    matrix,
    mains,
    include,
    output_dir,
    ld,
    vendor: raw.vendor,
    vendor_dir,
    go,
    jobs,
    root_dir,
  })
}

/// Expand `~` and environment variables in a configured path.
fn expand_path(value: &str) -> Result<PathBuf, ConfigError> {
  shellexpand::full(value)
    .map(|expanded| PathBuf::from(expanded.as_ref()))
    .map_err(|e| ConfigError::OutputDir {
      value: value.to_string(),
      message: e.to_string(),
    })
}

/// Lexical containment; vendored files are archived relative to the root.
fn is_within(path: &Path, root: &Path) -> bool {
  path.starts_with(root) && !path.components().any(|c| matches!(c, Component::ParentDir))
}

fn current_dir() -> Result<PathBuf, ConfigError> {
  std::env::current_dir()
    .and_then(dunce::canonicalize)
    .map_err(ConfigError::WorkingDir)
}

fn project_root(path: &Path) -> Result<PathBuf, ConfigError> {
  let parent = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p,
    _ => Path::new("."),
  };
  dunce::canonicalize(parent).map_err(|source| ConfigError::Root {
    path: path.to_path_buf(),
    source,
  })
}
