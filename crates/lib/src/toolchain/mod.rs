//! External capabilities used by stages.
//!
//! Stages never spawn tools directly; they go through the traits bundled in
//! [`Toolchain`], so tests can swap any of them out.

pub mod archive;
pub mod compile;
pub mod process;
pub mod vcs;
pub mod vendor;

use std::sync::Arc;

use crate::config::Config;

pub use archive::{ArchiveFormat, Archiver, TarGzArchiver, ZipArchiver, archive_files};
pub use compile::{CompileRequest, Compiler, GoCompiler, InjectedSymbol, binary_name};
pub use process::{CapturedOutput, ProcessError, run_captured, run_raw};
pub use vcs::{GitLsFiles, SourceLister};
pub use vendor::{GlideVendorer, Vendorer};

/// The capabilities a release run calls into.
#[derive(Clone)]
pub struct Toolchain {
  pub compiler: Arc<dyn Compiler>,
  pub sources: Arc<dyn SourceLister>,
  pub vendorer: Arc<dyn Vendorer>,
}

impl Toolchain {
  /// Default tools: `go`, `git` and `glide`.
  pub fn from_config(config: &Config) -> Self {
    Self {
      compiler: Arc::new(GoCompiler::new(config.go.clone())),
      sources: Arc::new(GitLsFiles::default()),
      vendorer: Arc::new(GlideVendorer),
    }
  }

  pub fn with_compiler(mut self, compiler: Arc<dyn Compiler>) -> Self {
    self.compiler = compiler;
    self
  }

  pub fn with_sources(mut self, sources: Arc<dyn SourceLister>) -> Self {
    self.sources = sources;
    self
  }

  pub fn with_vendorer(mut self, vendorer: Arc<dyn Vendorer>) -> Self {
    self.vendorer = vendorer;
    self
  }
}

impl std::fmt::Debug for Toolchain {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Toolchain").finish_non_exhaustive()
  }
}
