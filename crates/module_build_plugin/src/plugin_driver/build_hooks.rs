use module_build_common::{ModuleFormat, ModuleInfo};
use module_build_error::{BuildError, BuildResult};

use crate::{
  HookLoadArgs, HookLoadOutput, HookResolveIdArgs, HookResolveIdOutput, HookTransformArgs,
  PluginDriver, TransformResult,
};

use super::hook_error;

impl PluginDriver {
  pub fn build_start(&self) -> BuildResult<()> {
    for (plugin, ctx) in self.iter_plugin_with_context() {
      plugin.build_start(ctx).map_err(|error| hook_error(error, ctx, "build_start"))?;
    }
    Ok(())
  }

  pub fn resolve_id(&self, args: &HookResolveIdArgs<'_>) -> BuildResult<Option<HookResolveIdOutput>> {
    for (plugin, ctx) in self.iter_plugin_with_context() {
      if let Some(resolved) =
        plugin.resolve_id(ctx, args).map_err(|error| hook_error(error, ctx, "resolve_id"))?
      {
        return Ok(Some(resolved));
      }
    }
    Ok(None)
  }

  pub fn load(&self, args: &HookLoadArgs<'_>) -> BuildResult<Option<HookLoadOutput>> {
    for (plugin, ctx) in self.iter_plugin_with_context() {
      if let Some(loaded) =
        plugin.load(ctx, args).map_err(|error| hook_error(error, ctx, "load"))?
      {
        return Ok(Some(loaded));
      }
    }
    Ok(None)
  }

  /// Chains `transform` over every plugin. The last source map returned wins.
  pub fn transform(&self, id: &str, code: String, map: Option<String>) -> BuildResult<TransformResult> {
    let mut result = TransformResult { code, map, format: ModuleFormat::Esm, dependencies: vec![] };
    for (plugin, ctx) in self.iter_plugin_with_context() {
      let Some(output) = plugin
        .transform(ctx, &HookTransformArgs { id, code: &result.code })
        .map_err(|error| hook_error(error, ctx, "transform"))?
      else {
        continue;
      };

      if let Some(code) = output.code {
        result.code = code;
        if output.map.is_some() {
          result.map = output.map;
        }
      }
      if let Some(format) = output.format {
        result.format = format;
      }
      for dependency in output.dependencies {
        if !result.dependencies.contains(&dependency) {
          result.dependencies.push(dependency);
        }
      }
    }
    Ok(result)
  }

  pub fn module_parsed(&self, module_info: &ModuleInfo) -> BuildResult<()> {
    for (plugin, ctx) in self.iter_plugin_with_context() {
      plugin
        .module_parsed(ctx, module_info)
        .map_err(|error| hook_error(error, ctx, "module_parsed"))?;
    }
    Ok(())
  }

  pub fn build_end(&self, error: Option<&BuildError>) -> BuildResult<()> {
    for (plugin, ctx) in self.iter_plugin_with_context() {
      plugin.build_end(ctx, error).map_err(|error| hook_error(error, ctx, "build_end"))?;
    }
    Ok(())
  }
}
