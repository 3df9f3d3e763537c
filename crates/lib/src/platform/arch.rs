/// Returns the `GOARCH` name of the host CPU architecture
///
/// Architectures without a known Go spelling are passed through unchanged.
pub fn host_arch() -> &'static str {
  match std::env::consts::ARCH {
    "x86_64" => "amd64",
    "x86" => "386",
    "aarch64" => "arm64",
    "loongarch64" => "loong64",
    "powerpc64" => "ppc64",
    other => other,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  #[cfg(target_arch = "x86_64")]
  fn x86_64_maps_to_amd64() {
    assert_eq!(host_arch(), "amd64");
  }

  #[test]
  #[cfg(target_arch = "aarch64")]
  fn aarch64_maps_to_arm64() {
    assert_eq!(host_arch(), "arm64");
  }
}
