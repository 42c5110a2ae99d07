use module_build_error::BuildResult;

use crate::{HookGenerateBundleArgs, PluginDriver};

use super::hook_error;

impl PluginDriver {
  pub fn generate_bundle(&self, args: &mut HookGenerateBundleArgs<'_>) -> BuildResult<()> {
    for (plugin, ctx) in self.iter_plugin_with_context() {
      plugin.generate_bundle(ctx, args).map_err(|error| hook_error(error, ctx, "generate_bundle"))?;
    }
    Ok(())
  }
}
