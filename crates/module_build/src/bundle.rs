use anyhow::Context;
use module_build_common::{ModuleIdx, NormalizedOutputOptions, OutputOptions};
use module_build_error::BuildResult;
use module_build_plugin::{HookGenerateBundleArgs, SharedPluginDriver};

use crate::{
  generate_stage::{GenerateOutput, GenerateStage},
  types::{bundle_output::BundleOutput, IndexModules, SharedOptions},
  utils::normalize_options::normalize_output_options,
};

/// A loaded module graph, ready to be rendered any number of times.
pub struct Bundle {
  pub(crate) options: SharedOptions,
  pub(crate) plugin_driver: SharedPluginDriver,
  pub(crate) modules: IndexModules,
  pub(crate) entry: ModuleIdx,
  /// Loader warnings, kept as text so each render can report them again.
  pub(crate) warnings: Vec<String>,
}

impl Bundle {
  /// Renders the bundle in memory.
  pub fn generate(&self, output_options: &OutputOptions) -> BuildResult<BundleOutput> {
    let output_options = normalize_output_options(output_options, &self.options.cwd)?;
    self.render(&output_options, false)
  }

  /// Renders the bundle and writes every asset below the output directory.
  pub async fn write(&self, output_options: &OutputOptions) -> BuildResult<BundleOutput> {
    let output_options = normalize_output_options(output_options, &self.options.cwd)?;
    let output = self.render(&output_options, true)?;

    for asset in &output.assets {
      let path = output_options.dir.join(asset.filename());
      if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
          .await
          .with_context(|| format!("Failed to create directory {}", parent.display()))?;
      }
      tokio::fs::write(&path, &asset.content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(output)
  }

  fn render(
    &self,
    output_options: &NormalizedOutputOptions,
    is_write: bool,
  ) -> BuildResult<BundleOutput> {
    let GenerateOutput { mut assets, chunk, warnings: generate_warnings } =
      GenerateStage::new(output_options, &self.modules, self.entry).generate()?;

    self.plugin_driver.generate_bundle(&mut HookGenerateBundleArgs {
      is_write,
      options: output_options,
      chunk: &chunk,
      assets: &mut assets,
    })?;

    let warnings = self
      .warnings
      .iter()
      .map(|warning| anyhow::anyhow!("{warning}"))
      .chain(generate_warnings)
      .collect::<Vec<_>>();
    for warning in &warnings {
      log::warn!("{warning:#}");
    }

    Ok(BundleOutput { assets, chunk, warnings })
  }
}
