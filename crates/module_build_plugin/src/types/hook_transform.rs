use module_build_common::ModuleFormat;

#[derive(Debug)]
pub struct HookTransformArgs<'a> {
  pub id: &'a str,
  pub code: &'a str,
}

#[derive(Debug, Default)]
pub struct HookTransformOutput {
  /// `None` keeps the code unchanged.
  pub code: Option<String>,
  /// Source map JSON of `code`.
  pub map: Option<String>,
  pub format: Option<ModuleFormat>,
  /// Specifiers the module depends on that a scan of ESM syntax does not see, e.g. `require`
  /// calls of a CommonJS module.
  pub dependencies: Vec<String>,
}
