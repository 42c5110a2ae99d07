mod build_hooks;
mod output_hooks;
mod watch_hooks;

use std::{path::Path, sync::Arc};

use module_build_common::OnLog;

use crate::{PluginContext, SharedPlugin};

pub type SharedPluginDriver = Arc<PluginDriver>;

/// Runs hooks over the plugins in the order they were configured.
#[derive(Debug)]
pub struct PluginDriver {
  plugins: Vec<(SharedPlugin, PluginContext)>,
}

impl PluginDriver {
  pub fn new_shared(
    plugins: Vec<SharedPlugin>,
    cwd: &Path,
    on_log: Option<&OnLog>,
  ) -> SharedPluginDriver {
    let plugins = plugins
      .into_iter()
      .map(|plugin| {
        let ctx = PluginContext::new(cwd.to_path_buf(), on_log.cloned(), plugin.name());
        (plugin, ctx)
      })
      .collect();
    Arc::new(Self { plugins })
  }

  fn iter_plugin_with_context(&self) -> impl Iterator<Item = (&SharedPlugin, &PluginContext)> {
    self.plugins.iter().map(|(plugin, ctx)| (plugin, ctx))
  }
}

/// Prefixes a hook error with the plugin and hook it came from.
fn hook_error(error: anyhow::Error, ctx: &PluginContext, hook: &str) -> anyhow::Error {
  error.context(format!("[plugin {}] {hook}", ctx.plugin_name()))
}
