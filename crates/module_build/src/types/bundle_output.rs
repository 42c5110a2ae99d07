use module_build_common::{OutputAsset, RenderedChunk};

#[derive(Debug)]
pub struct BundleOutput {
  /// The chunk, its source map and every file plugins emitted, e.g. declarations.
  pub assets: Vec<OutputAsset>,
  pub chunk: RenderedChunk,
  pub warnings: Vec<anyhow::Error>,
}
