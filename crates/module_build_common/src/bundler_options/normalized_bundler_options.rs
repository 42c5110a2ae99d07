use std::path::PathBuf;

use crate::{OnLog, OutputFormat};

#[derive(Debug)]
pub struct NormalizedInputOptions {
  pub input: String,
  pub cwd: PathBuf,
  pub external: Vec<String>,
  pub treeshake: bool,
  pub on_log: Option<OnLog>,
}

impl NormalizedInputOptions {
  pub fn is_external(&self, specifier: &str) -> bool {
    self.external.iter().any(|name| {
      specifier == name
        || specifier.strip_prefix(name.as_str()).is_some_and(|rest| rest.starts_with('/'))
    })
  }
}

#[derive(Debug, Clone)]
pub struct NormalizedOutputOptions {
  /// Absolute path of the bundle.
  pub file: PathBuf,
  /// Absolute directory containing `file`.
  pub dir: PathBuf,
  pub format: OutputFormat,
  pub sourcemap: bool,
}

impl NormalizedOutputOptions {
  pub fn file_name(&self) -> String {
    self.file.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
  }
}

#[test]
fn external_matches_names_and_subpaths() {
  let options = NormalizedInputOptions {
    input: "src/index.ts".to_string(),
    cwd: PathBuf::from("/project"),
    external: vec!["left-pad".to_string(), "@scope/pkg".to_string()],
    treeshake: false,
    on_log: None,
  };

  assert!(options.is_external("left-pad"));
  assert!(options.is_external("@scope/pkg/sub"));
  assert!(!options.is_external("left-pad-extra"));
  assert!(!options.is_external("./left-pad"));
}
