//! The archive capability.
//!
//! Two formats exist: gzip-compressed tar for Unix-like targets and zip for
//! Windows. Writers run on the blocking thread pool.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::platform::OsFamily;
use crate::stage::StageError;

/// Archive formats an artifact can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
  TarGz,
  Zip,
}

static TAR_GZ: TarGzArchiver = TarGzArchiver;
static ZIP: ZipArchiver = ZipArchiver;

impl ArchiveFormat {
  /// Zip for Windows, gzip tar for everything else.
  pub fn for_family(family: OsFamily) -> Self {
    match family {
      OsFamily::Windows => Self::Zip,
      OsFamily::Unix => Self::TarGz,
    }
  }

  /// Format for a platform name from the build matrix.
  pub fn for_platform(platform: &str) -> Self {
    Self::for_family(OsFamily::of(platform))
  }

  /// File extension without the leading dot.
  pub fn extension(&self) -> &'static str {
    match self {
      Self::TarGz => "tar.gz",
      Self::Zip => "zip",
    }
  }

  pub fn archiver(&self) -> &'static dyn Archiver {
    match self {
      Self::TarGz => &TAR_GZ,
      Self::Zip => &ZIP,
    }
  }
}

/// Packs a directory into a single archive file.
#[async_trait]
pub trait Archiver: Send + Sync {
  fn format(&self) -> ArchiveFormat;

  /// Write the contents of `source_dir` to `dest`, nested under a top-level
  /// directory called `root_name`.
  async fn archive(&self, source_dir: &Path, root_name: &str, dest: &Path) -> Result<(), StageError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzArchiver;

#[async_trait]
impl Archiver for TarGzArchiver {
  fn format(&self) -> ArchiveFormat {
    ArchiveFormat::TarGz
  }

  async fn archive(&self, source_dir: &Path, root_name: &str, dest: &Path) -> Result<(), StageError> {
    let (source_dir, root_name, dest) = (source_dir.to_path_buf(), root_name.to_string(), dest.to_path_buf());
    info!(dest = %dest.display(), "writing tar.gz archive");
    blocking(dest.clone(), move || write_tar_gz_dir(&source_dir, &root_name, &dest)).await
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

#[async_trait]
impl Archiver for ZipArchiver {
  fn format(&self) -> ArchiveFormat {
    ArchiveFormat::Zip
  }

  async fn archive(&self, source_dir: &Path, root_name: &str, dest: &Path) -> Result<(), StageError> {
    let (source_dir, root_name, dest) = (source_dir.to_path_buf(), root_name.to_string(), dest.to_path_buf());
    info!(dest = %dest.display(), "writing zip archive");
    blocking(dest.clone(), move || write_zip_dir(&source_dir, &root_name, &dest)).await
  }
}

/// Write `files` (relative to `root`) to a gzip tar at `dest`, each re-rooted
/// under `root_name/`.
pub async fn archive_files(root: &Path, files: Vec<PathBuf>, root_name: &str, dest: &Path) -> Result<(), StageError> {
  let (root, root_name, dest) = (root.to_path_buf(), root_name.to_string(), dest.to_path_buf());
  info!(dest = %dest.display(), files = files.len(), "writing source archive");
  blocking(dest.clone(), move || write_tar_gz_files(&root, &files, &root_name, &dest)).await
}

async fn blocking<F>(dest: PathBuf, f: F) -> Result<(), StageError>
where
  F: FnOnce() -> io::Result<()> + Send + 'static,
{
  tokio::task::spawn_blocking(f)
    .await
    .map_err(|e| StageError::Join(e.to_string()))?
    .map_err(|e| StageError::Archive {
      path: dest,
      message: e.to_string(),
    })
}

fn gz_builder(dest: &Path) -> io::Result<tar::Builder<GzEncoder<BufWriter<File>>>> {
  let file = File::create(dest)?;
  Ok(tar::Builder::new(GzEncoder::new(BufWriter::new(file), Compression::default())))
}

fn finish_gz(builder: tar::Builder<GzEncoder<BufWriter<File>>>) -> io::Result<()> {
  let encoder = builder.into_inner()?;
  encoder.finish()?.flush()
}

fn write_tar_gz_dir(source_dir: &Path, root_name: &str, dest: &Path) -> io::Result<()> {
  let mut builder = gz_builder(dest)?;
  builder.append_dir_all(root_name, source_dir)?;
  finish_gz(builder)
}

fn write_tar_gz_files(root: &Path, files: &[PathBuf], root_name: &str, dest: &Path) -> io::Result<()> {
  let mut builder = gz_builder(dest)?;
  for file in files {
    debug!(file = %file.display(), "adding to source archive");
    builder.append_path_with_name(root.join(file), Path::new(root_name).join(file))?;
  }
  finish_gz(builder)
}

fn write_zip_dir(source_dir: &Path, root_name: &str, dest: &Path) -> io::Result<()> {
  let file = File::create(dest)?;
  let mut zip = ZipWriter::new(BufWriter::new(file));

  for entry in WalkDir::new(source_dir).follow_links(true).sort_by_file_name() {
    let entry = entry.map_err(io::Error::other)?;
    let relative = entry
      .path()
      .strip_prefix(source_dir)
      .map_err(io::Error::other)?;

    let mut name = root_name.to_string();
    for component in relative.components() {
      name.push('/');
      name.push_str(&component.as_os_str().to_string_lossy());
    }

    let metadata = entry.metadata().map_err(io::Error::other)?;
    let options = SimpleFileOptions::default()
      .compression_method(CompressionMethod::Deflated)
      .unix_permissions(unix_mode(&metadata));
    if entry.file_type().is_dir() {
      zip.add_directory(format!("{}/", name), options).map_err(io::Error::other)?;
    } else {
      zip.start_file(name, options).map_err(io::Error::other)?;
      io::copy(&mut File::open(entry.path())?, &mut zip)?;
    }
  }

  zip.finish().map_err(io::Error::other)?.flush()
}

#[cfg(unix)]
fn unix_mode(metadata: &std::fs::Metadata) -> u32 {
  use std::os::unix::fs::PermissionsExt;
  metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn unix_mode(metadata: &std::fs::Metadata) -> u32 {
  if metadata.is_dir() { 0o755 } else { 0o644 }
}
