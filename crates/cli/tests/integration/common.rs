//! Shared test helpers for CLI integration tests.

use std::collections::BTreeSet;
use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Stand-in for `go build -o <out> [-ldflags ...] <entry>`.
///
/// Writes `GOOS/GOARCH` and the ldflags to `<out>`. Exits 1 with a message on
/// stderr when `GOOS` matches `$RELEGO_TEST_FAIL_GOOS`.
const FAKE_GO: &str = r#"#!/bin/sh
if [ -n "$RELEGO_TEST_FAIL_GOOS" ] && [ "$GOOS" = "$RELEGO_TEST_FAIL_GOOS" ]; then
  echo "cannot build for $GOOS" >&2
  exit 1
fi
out=""
flags=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
    -ldflags) flags="$2"; shift ;;
  esac
  shift
done
printf '%s/%s %s' "$GOOS" "$GOARCH" "$flags" > "$out"
"#;

/// Isolated project directory with a fake `go` toolchain.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create a project whose `.relego.yaml` is `config` plus a `go:` line
  /// pointing at the fake compiler.
  pub fn with_config(config: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let env = Self { temp };
    let go = env.install_fake_go();
    env.write_file(".relego.yaml", &format!("{}\ngo: {}\n", config.trim_end(), go.display()));
    env
  }

  fn install_fake_go(&self) -> PathBuf {
    let path = self.temp.path().join("bin").join("go");
    self.write_file("bin/go", FAKE_GO);
    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  /// Names of everything directly inside `relative_path`.
  pub fn listing(&self, relative_path: &str) -> BTreeSet<String> {
    std::fs::read_dir(self.path(relative_path))
      .unwrap()
      .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
      .collect()
  }

  /// A relego command run from the project root with a fixed version.
  pub fn relego_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("relego");
    cmd.current_dir(self.temp.path());
    cmd.args(["--version", "1.0.0"]);
    cmd.env_remove("RELEGO_TEST_FAIL_GOOS");
    cmd
  }
}
