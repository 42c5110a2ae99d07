#[derive(Debug)]
pub struct HookLoadArgs<'a> {
  pub id: &'a str,
}

#[derive(Debug, Default)]
pub struct HookLoadOutput {
  pub code: String,
  /// Source map JSON.
  pub map: Option<String>,
}
