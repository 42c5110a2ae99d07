use std::path::Path;

use module_build_plugin::{HookLoadArgs, HookLoadOutput, PluginDriver};
use module_build_error::BuildResult;

/// `load` hooks first, then the file system.
pub fn load_source(plugin_driver: &PluginDriver, id: &str) -> BuildResult<HookLoadOutput> {
  if let Some(loaded) = plugin_driver.load(&HookLoadArgs { id })? {
    return Ok(loaded);
  }
  let code = std::fs::read_to_string(Path::new(id)).map_err(anyhow::Error::from)?;
  Ok(HookLoadOutput { code, map: None })
}
