/// A file of the build output: the bundle, its map, or a file a plugin emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputAsset {
  /// Slash separated path relative to the output directory.
  pub filename: String,
  pub content: String,
}

impl OutputAsset {
  pub fn filename(&self) -> &str {
    &self.filename
  }
}
