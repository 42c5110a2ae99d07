use std::sync::Arc;

use module_build_common::InputOptions;
use module_build_error::BuildResult;
use module_build_plugin::{PluginDriver, SharedPlugin, SharedPluginDriver};

use crate::{
  bundle::Bundle,
  module_loader::{ModuleLoader, ModuleLoaderOutput},
  types::SharedOptions,
  utils::{normalize_options::normalize_input_options, resolve_id::resolve_id},
};

pub struct Bundler {
  pub(crate) options: SharedOptions,
  pub(crate) plugin_driver: SharedPluginDriver,
}

impl Bundler {
  pub fn new(options: InputOptions) -> BuildResult<Self> {
    Self::with_plugins(options, vec![])
  }

  pub fn with_plugins(options: InputOptions, plugins: Vec<SharedPlugin>) -> BuildResult<Self> {
    let options = normalize_input_options(options)?;
    let plugin_driver = PluginDriver::new_shared(plugins, &options.cwd, options.on_log.as_ref());
    Ok(Self { options: Arc::new(options), plugin_driver })
  }

  /// Loads the module graph. `build_end` runs whether or not the build failed.
  pub async fn build(&self) -> BuildResult<Bundle> {
    let result = self.build_inner().await;
    self.plugin_driver.build_end(result.as_ref().err())?;
    result
  }

  async fn build_inner(&self) -> BuildResult<Bundle> {
    self.plugin_driver.build_start()?;

    if self.options.treeshake {
      log::warn!("Tree shaking is not supported, every statement of every module is kept");
    }

    let entry = resolve_id(&self.options, &self.plugin_driver, &self.options.input, None)?;
    if entry.is_external {
      return Err(
        anyhow::anyhow!("Entry module \"{}\" cannot be external", self.options.input).into(),
      );
    }

    let ModuleLoaderOutput { modules, entry, warnings } =
      ModuleLoader::new(Arc::clone(&self.options), Arc::clone(&self.plugin_driver))
        .fetch_all_modules(entry)
        .await?;
    log::debug!("loaded {} modules from {}", modules.len(), self.options.input);

    Ok(Bundle {
      options: Arc::clone(&self.options),
      plugin_driver: Arc::clone(&self.plugin_driver),
      modules,
      entry,
      warnings: warnings.iter().map(|warning| format!("{warning:#}")).collect(),
    })
  }
}
