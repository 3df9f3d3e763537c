use std::fmt;

/// Operating system family of a build target.
///
/// Only the distinction between Windows and everything else matters for
/// packaging: it decides the executable suffix and the archive format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
  Windows,
  Unix,
}

impl OsFamily {
  /// Classify a Go-style platform name (`GOOS` value)
  pub fn of(platform: &str) -> Self {
    if platform.eq_ignore_ascii_case("windows") {
      Self::Windows
    } else {
      Self::Unix
    }
  }

  /// Suffix appended to compiled executables
  pub fn exe_suffix(&self) -> &'static str {
    match self {
      Self::Windows => ".exe",
      Self::Unix => "",
    }
  }

  /// Returns the lowercase string identifier for this family
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Windows => "windows",
      Self::Unix => "unix",
    }
  }
}

impl fmt::Display for OsFamily {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Returns the `GOOS` name of the host operating system
pub fn host_os() -> &'static str {
  match std::env::consts::OS {
    "macos" => "darwin",
    other => other,
  }
}
