use std::collections::HashMap;

use tracing::debug;

use crate::config::Config;
use crate::platform::OsFamily;
use crate::stage::{Stage, StageError, require_scratch};
use crate::target::Target;
use crate::toolchain::{CompileRequest, Compiler, InjectedSymbol, binary_name};

/// Build every configured entry point into the scratch directory.
pub async fn run(target: &Target, compiler: &dyn Compiler) -> Result<(), StageError> {
  let scratch = require_scratch(target, Stage::Compile)?;
  let Some((platform, arch)) = target.platform_arch() else {
    return Err(StageError::Precondition {
      stage: Stage::Compile,
      missing: "a binary target",
    });
  };

  let config = target.config();
  let suffix = OsFamily::of(platform).exe_suffix();
  let symbols = injected_symbols(config);

  for (entry, name) in binary_names(&config.mains, config)? {
    let request = CompileRequest {
      platform: platform.to_string(),
      arch: arch.to_string(),
      entry: entry.clone(),
      output: scratch.join(format!("{}{}", name, suffix)),
      symbols: symbols.clone(),
      work_dir: config.root_dir.clone(),
    };
    debug!(target = %target, entry = %entry, output = %request.output.display(), "compile request");
    compiler.compile(&request).await?;
  }

  Ok(())
}

/// Binary name of every entry point, in order.
///
/// Fails before anything is built when a name cannot be derived or when two
/// entry points share one.
fn binary_names<'a>(mains: &'a [String], config: &Config) -> Result<Vec<(&'a String, String)>, StageError> {
  let mut seen: HashMap<String, &String> = HashMap::new();
  let mut names = Vec::with_capacity(mains.len());
  for entry in mains {
    let name = binary_name(entry, &config.root_dir).ok_or_else(|| StageError::EntryPoint(entry.clone()))?;
    if let Some(first) = seen.insert(name.clone(), entry) {
      return Err(StageError::BinaryCollision {
        name,
        first: first.clone(),
        second: entry.clone(),
      });
    }
    names.push((entry, name));
  }
  Ok(names)
}

/// Version and build date symbols to inject, per the `ld` config.
pub fn injected_symbols(config: &Config) -> Vec<InjectedSymbol> {
  let Some(ld) = &config.ld else {
    return Vec::new();
  };

  let mut symbols = Vec::new();
  if let Some(path) = ld.version_path.as_deref().filter(|p| !p.is_empty()) {
    symbols.push(InjectedSymbol {
      path: path.to_string(),
      value: config.version.clone(),
    });
  }
  if let Some(path) = ld.build_date_path.as_deref().filter(|p| !p.is_empty()) {
    symbols.push(InjectedSymbol {
      path: path.to_string(),
      value: config.build_date_rfc3339(),
    });
  }
  symbols
}
