//! Platform naming.
//!
//! Targets are named with Go's `GOOS`/`GOARCH` vocabulary since those values are
//! handed straight to the compiler. This module maps the host onto that
//! vocabulary and classifies target platforms.

pub mod arch;
pub mod os;

use std::fmt;

pub use arch::host_arch;
pub use os::{OsFamily, host_os};

/// Host platform in `GOOS`/`GOARCH` terms (e.g. "linux/amd64")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostPlatform {
  pub os: &'static str,
  pub arch: &'static str,
}

impl HostPlatform {
  /// Detect the platform this process runs on
  pub fn detect() -> Self {
    Self {
      os: host_os(),
      arch: host_arch(),
    }
  }
}

impl fmt::Display for HostPlatform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.os, self.arch)
  }
}
