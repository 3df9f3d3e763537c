//! Release configuration.
//!
//! The config file is YAML with camelCase keys:
//!
//! ```yaml
//! name: mytool
//! matrix:
//!   - platform: linux
//!     arch: [amd64, arm64]
//!   - platform: windows
//!     arch: [amd64]
//!   - platform: src
//! mains: [./cmd/mytool]
//! include: [README.md, LICENSE]
//! outputDir: $HOME/releases
//! ld:
//!   versionPath: main.version
//!   buildDatePath: main.buildDate
//! vendor:
//!   prune: true
//! ```

mod load;
mod types;

pub use load::{LoadOptions, load_config, parse_config, resolve};
pub use types::*;
