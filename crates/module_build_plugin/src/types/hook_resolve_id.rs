use arcstr::ArcStr;

#[derive(Debug)]
pub struct HookResolveIdArgs<'a> {
  /// `None` for the entry.
  pub importer: Option<&'a str>,
  pub specifier: &'a str,
  pub is_entry: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookResolveIdOutput {
  pub id: ArcStr,
  pub external: bool,
}
