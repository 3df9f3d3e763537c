//! relego-lib: release packaging for Go projects
//!
//! A release run turns one config file into a set of archives, one per cell
//! of the build matrix:
//! - `config`: the `.relego.yaml` model and its defaults
//! - `target`: matrix cells and their canonical names
//! - `stage` / `pipeline`: the ordered steps applied to each target
//! - `toolchain`: the external tools stages call into (go, git, glide, archivers)
//! - `release`: the concurrent orchestrator that ties it all together

pub mod config;
pub mod consts;
pub mod pipeline;
pub mod platform;
pub mod progress;
pub mod release;
pub mod stage;
pub mod target;
pub mod toolchain;

pub use config::{Config, ConfigError, LoadOptions, load_config};
pub use release::{ReleaseError, ReleaseOptions, ReleaseReport, run_release};
pub use toolchain::Toolchain;
