use std::{any::Any, borrow::Cow, fmt::Debug, sync::Arc};

use module_build_common::{ModuleInfo, WatchChangeKind};
use module_build_error::BuildError;

use crate::{
  HookGenerateBundleArgs, HookLoadArgs, HookLoadOutput, HookResolveIdArgs, HookResolveIdOutput,
  HookTransformArgs, HookTransformOutput, PluginContext,
};

pub type HookResolveIdReturn = anyhow::Result<Option<HookResolveIdOutput>>;
pub type HookLoadReturn = anyhow::Result<Option<HookLoadOutput>>;
pub type HookTransformReturn = anyhow::Result<Option<HookTransformOutput>>;
pub type HookNoopReturn = anyhow::Result<()>;

/// A processing step of the build. Every hook has a no-op default; a plugin overrides the ones it
/// takes part in. Plugins are shared across module tasks and watch passes, so state lives behind
/// atomics or locks.
pub trait Plugin: Any + Debug + Send + Sync + 'static {
  fn name(&self) -> Cow<'static, str>;

  // --- Build hooks ---

  fn build_start(&self, _ctx: &PluginContext) -> HookNoopReturn {
    Ok(())
  }

  /// The first plugin returning `Some` decides where a specifier points.
  fn resolve_id(&self, _ctx: &PluginContext, _args: &HookResolveIdArgs<'_>) -> HookResolveIdReturn {
    Ok(None)
  }

  /// The first plugin returning `Some` provides the source; otherwise it is read from disk.
  fn load(&self, _ctx: &PluginContext, _args: &HookLoadArgs<'_>) -> HookLoadReturn {
    Ok(None)
  }

  /// Called in plugin order, each plugin seeing the code returned by the previous one.
  fn transform(&self, _ctx: &PluginContext, _args: &HookTransformArgs<'_>) -> HookTransformReturn {
    Ok(None)
  }

  fn module_parsed(&self, _ctx: &PluginContext, _module_info: &ModuleInfo) -> HookNoopReturn {
    Ok(())
  }

  fn build_end(&self, _ctx: &PluginContext, _error: Option<&BuildError>) -> HookNoopReturn {
    Ok(())
  }

  // --- Output hooks ---

  fn generate_bundle(
    &self,
    _ctx: &PluginContext,
    _args: &mut HookGenerateBundleArgs<'_>,
  ) -> HookNoopReturn {
    Ok(())
  }

  // --- Watch hooks ---

  fn watch_change(&self, _ctx: &PluginContext, _id: &str, _kind: WatchChangeKind) -> HookNoopReturn {
    Ok(())
  }
}

pub type SharedPlugin = Arc<dyn Plugin>;
