//! Release runs through the real binary.
#![cfg(unix)]

use std::collections::BTreeSet;

use predicates::prelude::*;

use super::common::TestEnv;

const THREE_TARGETS: &str = r#"
name: tool
matrix:
  - platform: linux
    arch: [amd64]
  - platform: darwin
    arch: [arm64]
  - platform: windows
    arch: [amd64]
mains: ["./cmd/tool"]
include: [LICENSE]
outputDir: dist
ld:
  versionPath: main.version
"#;

#[test]
fn release_packages_every_target() {
  let env = TestEnv::with_config(THREE_TARGETS);
  env.write_file("LICENSE", "MIT");

  env
    .relego_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Released 3 artifact(s) for tool 1.0.0"));

  assert_eq!(
    env.listing("dist"),
    BTreeSet::from([
      "tool_1.0.0_darwin_arm64.tar.gz".to_string(),
      "tool_1.0.0_linux_amd64.tar.gz".to_string(),
      "tool_1.0.0_windows_amd64.zip".to_string(),
    ])
  );
}

#[test]
fn failing_target_exits_nonzero_and_shows_output() {
  let env = TestEnv::with_config(THREE_TARGETS);
  env.write_file("LICENSE", "MIT");

  env
    .relego_cmd()
    .env("RELEGO_TEST_FAIL_GOOS", "darwin")
    .assert()
    .failure()
    .stderr(predicate::str::contains("tool_1.0.0_darwin_arm64: compile failed"))
    .stderr(predicate::str::contains("cannot build for darwin"));

  assert!(env.path("dist/tool_1.0.0_linux_amd64.tar.gz").is_file());
  assert!(env.path("dist/tool_1.0.0_windows_amd64.zip").is_file());
  assert!(!env.path("dist/tool_1.0.0_darwin_arm64.tar.gz").exists());
}

#[test]
fn json_report_lists_artifacts_and_failures() {
  let env = TestEnv::with_config(THREE_TARGETS);
  env.write_file("LICENSE", "MIT");

  let output = env
    .relego_cmd()
    .args(["-o", "json"])
    .env("RELEGO_TEST_FAIL_GOOS", "windows")
    .output()
    .unwrap();

  assert!(!output.status.success());
  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["version"], "1.0.0");
  assert_eq!(report["artifacts"].as_array().unwrap().len(), 2);
  assert_eq!(report["failures"][0]["target"], "tool_1.0.0_windows_amd64");
  assert_eq!(report["failures"][0]["stage"], "compile");
  assert!(
    report["failures"][0]["output"]
      .as_str()
      .unwrap()
      .contains("cannot build for windows")
  );
}

#[test]
fn jobs_one_skips_targets_after_a_failure() {
  let env = TestEnv::with_config(THREE_TARGETS);
  env.write_file("LICENSE", "MIT");

  env
    .relego_cmd()
    .args(["--jobs", "1"])
    .env("RELEGO_TEST_FAIL_GOOS", "linux")
    .assert()
    .failure();

  assert!(!env.path("dist/tool_1.0.0_linux_amd64.tar.gz").exists());
}

#[test]
fn missing_include_fails_the_target() {
  let env = TestEnv::with_config(
    r#"
name: tool
matrix:
  - platform: linux
    arch: [amd64]
include: [NOTICE]
outputDir: dist
"#,
  );

  env
    .relego_cmd()
    .assert()
    .failure()
    .stderr(predicate::str::contains("stage-includes failed"));
}

#[test]
fn failing_vendor_step_aborts_the_release() {
  let env = TestEnv::with_config(
    r#"
name: tool
matrix:
  - platform: linux
    arch: [amd64]
outputDir: dist
vendor:
  path: ./bin/no-such-glide
"#,
  );

  env
    .relego_cmd()
    .assert()
    .failure()
    .stderr(predicate::str::contains("Release aborted"));

  assert!(!env.path("dist").exists());
}

#[test]
fn artifacts_land_in_the_invocation_directory() {
  let env = TestEnv::with_config("name: unused\n");
  let go = env.path("bin/go");
  env.write_file(
    "sub/.relego.yaml",
    &format!(
      "name: tool\nmatrix:\n  - platform: linux\n    arch: [amd64]\ngo: {}\n",
      go.display()
    ),
  );

  env.relego_cmd().args(["-c", "sub/.relego.yaml"]).assert().success();

  assert!(env.path("tool_1.0.0_linux_amd64.tar.gz").is_file());
  assert!(!env.path("sub/tool_1.0.0_linux_amd64.tar.gz").exists());
}
