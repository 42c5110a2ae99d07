use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WatcherOptions {
  /// How long to wait for further changes before rebuilding.
  pub build_delay: Duration,
  pub clear_screen: bool,
  /// Globs relative to `cwd`. Only matching files trigger a rebuild.
  pub include: Vec<String>,
  pub exclude: Vec<String>,
}

impl Default for WatcherOptions {
  fn default() -> Self {
    Self {
      build_delay: Duration::ZERO,
      clear_screen: true,
      include: vec!["**".to_string()],
      exclude: vec!["node_modules/**".to_string()],
    }
  }
}
