//! Config loading from disk.

use relego_lib::config::{ConfigError, LoadOptions, load_config};
use relego_lib::target::plan_release;
use std::sync::Arc;

use super::common::Project;

#[test]
fn relego_yaml_with_legacy_keys_loads() {
  let project = Project::new(
    r#"
name: tool
matrix:
  - os: linux
    arch: [amd64]
  - os: source
glide:
  glideVC: true
"#,
  );

  let config = load_config(&project.temp.path().join(".relego.yaml"), &LoadOptions::default()).unwrap();

  assert_eq!(config.root_dir, project.root());
  assert_eq!(config.output_dir, dunce::canonicalize(std::env::current_dir().unwrap()).unwrap());
  assert!(config.vendor.as_ref().is_some_and(|v| v.prune));
  let names: Vec<_> = plan_release(&Arc::new(config))
    .unwrap()
    .iter()
    .map(|t| t.label())
    .collect();
  assert_eq!(names, vec!["linux/amd64", "src"]);
}

#[test]
fn missing_config_is_a_read_error() {
  let project = Project::new("");
  let err = load_config(&project.temp.path().join("nope.yaml"), &LoadOptions::default()).unwrap_err();
  assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn duplicate_targets_fail_planning() {
  let project = Project::new(
    r#"
name: tool
matrix:
  - platform: linux
    arch: [amd64]
  - platform: linux
    arch: [amd64]
"#,
  );
  let err = plan_release(&project.config()).unwrap_err();
  assert!(matches!(err, ConfigError::DuplicateTarget { ref name } if name == "tool_1.2.3_linux_amd64"));
}
