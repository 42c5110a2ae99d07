use module_build_common::{NormalizedOutputOptions, OutputAsset, RenderedChunk};

pub struct HookGenerateBundleArgs<'a> {
  /// `true` when the bundle is going to be written to disk.
  pub is_write: bool,
  pub options: &'a NormalizedOutputOptions,
  pub chunk: &'a RenderedChunk,
  /// Every asset of the bundle, the chunk itself included. Plugins may append files.
  pub assets: &'a mut Vec<OutputAsset>,
}
