use arcstr::ArcStr;

use crate::ModuleId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModuleFormat {
  #[default]
  Esm,
  CommonJs,
}

/// Snapshot of a module handed to `module_parsed`.
#[derive(Debug)]
pub struct ModuleInfo {
  pub id: ModuleId,
  pub is_entry: bool,
  pub code: ArcStr,
  pub format: ModuleFormat,
  pub imported_ids: Vec<ModuleId>,
  pub dynamically_imported_ids: Vec<ModuleId>,
}
