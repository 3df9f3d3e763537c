//! End-to-end release runs with fake compilers and source listings.

use std::collections::BTreeSet;

use relego_lib::progress::{self, ProgressEvent, ProgressSender};
use relego_lib::release::{ReleaseOptions, run_release};
use relego_lib::stage::Stage;

use super::common::{Project, RecordingCompiler, tar_entries, toolchain, zip_entries};

#[tokio::test]
async fn linux_target_produces_tar_gz_and_no_scratch_dir() {
  let project = Project::new(
    r#"
name: tool
matrix:
  - platform: linux
    arch: [amd64]
mains: ["./cmd/tool"]
include: [README.md]
outputDir: dist
"#,
  );
  project.write("README.md", "# tool");
  let config = project.config();
  let tools = toolchain(&config, RecordingCompiler::default(), &[]);

  let report = run_release(config, &tools, &ReleaseOptions::default(), &ProgressSender::disabled())
    .await
    .unwrap();

  assert!(report.is_success());
  assert_eq!(project.listing("dist"), BTreeSet::from(["tool_1.2.3_linux_amd64.tar.gz".to_string()]));
  let archive = project.root().join("dist/tool_1.2.3_linux_amd64.tar.gz");
  assert_eq!(report.artifacts[0].path, archive);
  let entries = tar_entries(&archive);
  assert!(entries.contains("tool_1.2.3_linux_amd64/tool"));
  assert!(entries.contains("tool_1.2.3_linux_amd64/README.md"));
}

#[tokio::test]
async fn windows_target_produces_zip_with_exe() {
  let project = Project::new(
    r#"
name: tool
matrix:
  - platform: windows
    arch: [amd64]
mains: ["./cmd/tool"]
outputDir: dist
"#,
  );
  let config = project.config();
  let tools = toolchain(&config, RecordingCompiler::default(), &[]);

  let report = run_release(config, &tools, &ReleaseOptions::default(), &ProgressSender::disabled())
    .await
    .unwrap();

  assert!(report.is_success());
  assert_eq!(project.listing("dist"), BTreeSet::from(["tool_1.2.3_windows_amd64.zip".to_string()]));
  let entries = zip_entries(&project.root().join("dist/tool_1.2.3_windows_amd64.zip"));
  assert!(entries.contains("tool_1.2.3_windows_amd64/tool.exe"));
}

#[tokio::test]
async fn source_only_matrix_archives_tracked_and_vendored_files() {
  let project = Project::new(
    r#"
name: tool
matrix:
  - platform: src
mains: ["."]
outputDir: dist
"#,
  );
  project.write("main.go", "package main");
  project.write("go.mod", "module tool");
  project.write("vendor/github.com/acme/lib/lib.go", "package lib");
  project.write("vendor/github.com/acme/lib/.git/HEAD", "ref: main");
  let config = project.config();
  let compiler = RecordingCompiler::default();
  let tools = toolchain(&config, compiler, &["main.go", "go.mod", "vendor/github.com/acme/lib/lib.go"]);

  let report = run_release(config, &tools, &ReleaseOptions::default(), &ProgressSender::disabled())
    .await
    .unwrap();

  assert!(report.is_success());
  assert_eq!(project.listing("dist"), BTreeSet::from(["tool_1.2.3_src.tar.gz".to_string()]));
  assert_eq!(
    tar_entries(&project.root().join("dist/tool_1.2.3_src.tar.gz")),
    BTreeSet::from([
      "tool_1.2.3_src/main.go".to_string(),
      "tool_1.2.3_src/go.mod".to_string(),
      "tool_1.2.3_src/vendor/github.com/acme/lib/lib.go".to_string(),
    ])
  );
}

#[tokio::test]
async fn one_failing_target_leaves_the_others_complete() {
  let project = Project::new(
    r#"
name: tool
matrix:
  - platform: linux
    arch: [amd64]
  - platform: darwin
    arch: [arm64]
  - platform: windows
    arch: [amd64]
outputDir: dist
"#,
  );
  let config = project.config();
  let compiler = RecordingCompiler {
    fail_on: vec!["darwin".into()],
    ..Default::default()
  };
  let tools = toolchain(&config, compiler, &[]);
  let (tx, mut rx) = progress::channel();

  let report = run_release(config, &tools, &ReleaseOptions::default(), &tx).await.unwrap();
  drop(tx);

  assert!(!report.is_success());
  let built: Vec<_> = report.artifacts.iter().map(|a| a.target.as_str()).collect();
  assert_eq!(built, vec!["tool_1.2.3_linux_amd64", "tool_1.2.3_windows_amd64"]);
  assert_eq!(report.failures.len(), 1);
  let failure = &report.failures[0];
  assert_eq!(failure.target, "tool_1.2.3_darwin_arm64");
  assert_eq!(failure.stage, Some(Stage::Compile));
  assert_eq!(failure.output.as_deref(), Some("cannot build for darwin"));

  // The failed target keeps its scratch directory; cleanup never ran for it.
  assert!(project.root().join("dist/tool_1.2.3_darwin_arm64").is_dir());
  assert!(!project.root().join("dist/tool_1.2.3_linux_amd64").exists());

  let mut failed = Vec::new();
  while let Some(event) = rx.recv().await {
    if let ProgressEvent::Failed { index, stage, .. } = event {
      failed.push((index, stage));
    }
  }
  assert_eq!(failed, vec![(1, Stage::Compile)]);
}

#[tokio::test]
async fn ld_symbols_are_identical_across_targets() {
  let project = Project::new(
    r#"
name: tool
matrix:
  - platform: linux
    arch: [amd64, arm64]
ld:
  versionPath: main.version
  buildDatePath: main.buildDate
outputDir: dist
"#,
  );
  let config = project.config();
  let compiler = std::sync::Arc::new(RecordingCompiler::default());
  let tools = toolchain(&config, RecordingCompiler::default(), &[]).with_compiler(compiler.clone());

  run_release(config, &tools, &ReleaseOptions { parallelism: Some(2) }, &ProgressSender::disabled())
    .await
    .unwrap();

  let requests = compiler.requests.lock().unwrap();
  assert_eq!(requests.len(), 2);
  assert_eq!(requests[0].symbols, requests[1].symbols);
  assert_eq!(requests[0].symbols[0].value, "1.2.3");
}
