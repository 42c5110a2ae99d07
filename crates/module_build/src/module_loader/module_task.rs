use std::{path::Path, sync::Arc};

use arcstr::ArcStr;
use indexmap::IndexMap;
use module_build_common::{ModuleId, ModuleIdx, ModuleInfo, ResolvedId};
use module_build_ecmascript::EcmaCompiler;
use module_build_error::{BuildError, BuildResult};

use super::task_context::TaskContext;
use crate::{
  types::{
    module::{ImportKind, NormalModule},
    module_loader_msg::{ModuleLoaderMsg, NormalModuleTaskResult},
  },
  utils::{load_source::load_source, resolve_id::resolve_id},
};

pub struct ModuleTaskOwner {
  importer_id: String,
}

impl ModuleTaskOwner {
  pub fn new(importer_id: String) -> Self {
    ModuleTaskOwner { importer_id }
  }
}

pub struct ModuleTask {
  ctx: Arc<TaskContext>,
  idx: ModuleIdx,
  owner: Option<ModuleTaskOwner>,
  resolved_id: ResolvedId,
  is_user_defined_entry: bool,
}

impl ModuleTask {
  pub fn new(
    ctx: Arc<TaskContext>,
    idx: ModuleIdx,
    owner: Option<ModuleTaskOwner>,
    resolved_id: ResolvedId,
    is_user_defined_entry: bool,
  ) -> Self {
    Self { ctx, idx, owner, resolved_id, is_user_defined_entry }
  }

  pub async fn run(self) {
    let msg = match self.run_inner() {
      Ok(result) => ModuleLoaderMsg::NormalModuleDone(Box::new(result)),
      Err(errors) => ModuleLoaderMsg::BuildErrors(errors.0),
    };
    // The loader only drops the receiver once every task has reported.
    let _ = self.ctx.tx.send(msg).await;
  }

  fn run_inner(&self) -> BuildResult<NormalModuleTaskResult> {
    let id = ModuleId::new(ArcStr::clone(&self.resolved_id.id));
    let stable_id = id.stabilize(&self.ctx.options.cwd);
    let plugin_driver = &self.ctx.plugin_driver;

    let loaded = load_source(plugin_driver, &id).map_err(|error| {
      anyhow::anyhow!(
        "Could not load {stable_id}{} - {error}.",
        self
          .owner
          .as_ref()
          .map(|owner| format!(" (imported by {})", owner.importer_id))
          .unwrap_or_default(),
      )
    })?;

    let transformed = plugin_driver.transform(&id, loaded.code, loaded.map)?;
    let syntax = EcmaCompiler::scan(&transformed.code, Path::new(id.as_ref()))
      .map_err(BuildError::from)?;

    let mut specifiers = syntax
      .dependency_specifiers()
      .into_iter()
      .map(|specifier| {
        let kind =
          if syntax.is_dynamic_only(specifier) { ImportKind::Dynamic } else { ImportKind::Static };
        (specifier.to_string(), kind)
      })
      .collect::<Vec<_>>();
    for dependency in &transformed.dependencies {
      if !specifiers.iter().any(|(specifier, _)| specifier == dependency) {
        specifiers.push((dependency.clone(), ImportKind::Static));
      }
    }

    let mut errors = vec![];
    let mut resolved_deps = Vec::with_capacity(specifiers.len());
    for (specifier, kind) in specifiers {
      match resolve_id(&self.ctx.options, plugin_driver, &specifier, Some(id.as_ref())) {
        Ok(resolved) => resolved_deps.push((specifier, resolved, kind)),
        Err(error) => errors.extend(error.0),
      }
    }
    if !errors.is_empty() {
      return Err(errors.into());
    }

    let code = ArcStr::from(transformed.code);
    let module_info = ModuleInfo {
      id: id.clone(),
      is_entry: self.is_user_defined_entry,
      code: ArcStr::clone(&code),
      format: transformed.format,
      imported_ids: resolved_deps
        .iter()
        .filter(|(_, _, kind)| *kind == ImportKind::Static)
        .map(|(_, resolved, _)| ModuleId::new(ArcStr::clone(&resolved.id)))
        .collect(),
      dynamically_imported_ids: resolved_deps
        .iter()
        .filter(|(_, _, kind)| *kind == ImportKind::Dynamic)
        .map(|(_, resolved, _)| ModuleId::new(ArcStr::clone(&resolved.id)))
        .collect(),
    };
    plugin_driver.module_parsed(&module_info)?;
    log::debug!("parsed {stable_id} ({} dependencies)", resolved_deps.len());

    Ok(NormalModuleTaskResult {
      module: NormalModule {
        idx: self.idx,
        id,
        stable_id,
        is_entry: self.is_user_defined_entry,
        code,
        map: transformed.map,
        format: transformed.format,
        syntax,
        dependencies: IndexMap::default(),
      },
      resolved_deps,
      warnings: vec![],
    })
  }
}
