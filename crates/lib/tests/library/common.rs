//! Shared helpers for library integration tests.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Local, TimeZone};
use relego_lib::config::{Config, LoadOptions, parse_config};
use relego_lib::stage::StageError;
use relego_lib::toolchain::{CompileRequest, Compiler, ProcessError, SourceLister, Toolchain};
use tempfile::TempDir;

/// Stands in for `go build`: writes a marker file, or fails for listed platforms.
#[derive(Default)]
pub struct RecordingCompiler {
  pub fail_on: Vec<String>,
  pub requests: Mutex<Vec<CompileRequest>>,
}

#[async_trait]
impl Compiler for RecordingCompiler {
  async fn compile(&self, request: &CompileRequest) -> Result<(), StageError> {
    self.requests.lock().unwrap().push(request.clone());
    if self.fail_on.contains(&request.platform) {
      return Err(
        ProcessError::Failed {
          command: format!("go build -o {} {}", request.output.display(), request.entry),
          code: Some(2),
          output: format!("cannot build for {}", request.platform),
        }
        .into(),
      );
    }
    std::fs::write(&request.output, format!("{}/{}", request.platform, request.arch))
      .map_err(StageError::fs("write", &request.output))
  }
}

/// Tracked-file listing with a fixed answer.
pub struct StaticSources(pub Vec<String>);

#[async_trait]
impl SourceLister for StaticSources {
  async fn tracked_files(&self, _root: &Path) -> Result<Vec<PathBuf>, StageError> {
    Ok(self.0.iter().map(PathBuf::from).collect())
  }
}

/// A throwaway project directory with a `.relego.yaml`.
pub struct Project {
  pub temp: TempDir,
}

impl Project {
  pub fn new(config: &str) -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(".relego.yaml"), config).unwrap();
    Self { temp }
  }

  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  pub fn write(&self, relative: &str, content: &str) {
    let path = self.temp.path().join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
  }

  /// Load the project's config with a fixed version and build date.
  pub fn config(&self) -> Arc<Config> {
    let path = self.temp.path().join(".relego.yaml");
    let content = std::fs::read_to_string(&path).unwrap();
    let options = LoadOptions {
      version_override: Some("1.2.3".into()),
      build_date: Some(Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()),
      jobs_override: None,
      working_dir: Some(self.root()),
    };
    Arc::new(parse_config(&content, &path, &options).unwrap())
  }

  /// Names of everything directly inside `relative`.
  pub fn listing(&self, relative: &str) -> BTreeSet<String> {
    std::fs::read_dir(self.temp.path().join(relative))
      .unwrap()
      .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
      .collect()
  }
}

pub fn toolchain(config: &Config, compiler: RecordingCompiler, tracked: &[&str]) -> Toolchain {
  Toolchain::from_config(config)
    .with_compiler(Arc::new(compiler))
    .with_sources(Arc::new(StaticSources(tracked.iter().map(|s| s.to_string()).collect())))
}

pub fn tar_entries(path: &Path) -> BTreeSet<String> {
  let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(File::open(path).unwrap()));
  archive
    .entries()
    .unwrap()
    .map(|e| e.unwrap().path().unwrap().to_string_lossy().trim_end_matches('/').to_string())
    .collect()
}

pub fn zip_entries(path: &Path) -> BTreeSet<String> {
  let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
  archive.file_names().map(|n| n.trim_end_matches('/').to_string()).collect()
}
