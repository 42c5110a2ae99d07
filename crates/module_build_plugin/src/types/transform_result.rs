use module_build_common::ModuleFormat;

/// The combined outcome of every `transform` hook for one module.
#[derive(Debug, Default)]
pub struct TransformResult {
  pub code: String,
  pub map: Option<String>,
  pub format: ModuleFormat,
  pub dependencies: Vec<String>,
}
