/// Application name used in log output and user-facing messages.
pub const APP_NAME: &str = "relego";

/// Config file looked up when no `--config` flag is given.
pub const DEFAULT_CONFIG_FILE: &str = ".relego.yaml";

/// Default directory holding vendored dependencies, relative to the project root.
pub const DEFAULT_VENDOR_DIR: &str = "vendor";

/// Default compiler binary.
pub const DEFAULT_GO: &str = "go";

/// Default vendoring tool and its pruning companion.
pub const DEFAULT_GLIDE: &str = "glide";
pub const DEFAULT_GLIDE_VC: &str = "glide-vc";

/// Platform values that request a source archive instead of a binary.
pub const SOURCE_PLATFORMS: &[&str] = &["src", "source"];

/// Suffix of the canonical name of a source-archive target.
pub const SOURCE_SUFFIX: &str = "src";

/// `chrono` format for the default release version (derived from the build timestamp).
pub const VERSION_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M";
