pub mod normalized_bundler_options;
pub mod on_log;
pub mod output_format;
pub mod watch_options;

use std::path::PathBuf;

use crate::{OnLog, OutputFormat};

#[derive(Default, Debug, Clone)]
pub struct InputOptions {
  /// The single entry module, relative to `cwd`.
  pub input: Option<String>,
  pub cwd: Option<PathBuf>,
  /// Dependency names that are referenced rather than inlined. `lodash` also covers `lodash/fp`.
  pub external: Option<Vec<String>>,
  pub treeshake: Option<bool>,
  pub on_log: Option<OnLog>,
}

#[derive(Default, Debug, Clone)]
pub struct OutputOptions {
  pub file: Option<String>,
  pub format: Option<OutputFormat>,
  pub sourcemap: Option<bool>,
}
