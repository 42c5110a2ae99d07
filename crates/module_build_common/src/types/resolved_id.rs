use arcstr::ArcStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
  pub id: ArcStr,
  pub is_external: bool,
}

impl ResolvedId {
  pub fn internal(id: impl Into<ArcStr>) -> Self {
    Self { id: id.into(), is_external: false }
  }

  pub fn external(id: impl Into<ArcStr>) -> Self {
    Self { id: id.into(), is_external: true }
  }
}
