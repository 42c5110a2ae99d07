use module_build_common::ResolvedId;

use super::module::{ImportKind, NormalModule};

pub struct NormalModuleTaskResult {
  /// `dependencies` is still empty; the loader fills it from `resolved_deps`.
  pub module: NormalModule,
  pub resolved_deps: Vec<(String, ResolvedId, ImportKind)>,
  pub warnings: Vec<anyhow::Error>,
}

pub enum ModuleLoaderMsg {
  NormalModuleDone(Box<NormalModuleTaskResult>),
  BuildErrors(Vec<anyhow::Error>),
}
