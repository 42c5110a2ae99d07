mod module_task;
pub mod task_context;

use std::{collections::hash_map::Entry, sync::Arc};

use arcstr::ArcStr;
use module_build_common::{ModuleIdx, ResolvedId};
use module_build_error::BuildResult;
use module_build_plugin::SharedPluginDriver;
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc::Receiver;

use self::{
  module_task::{ModuleTask, ModuleTaskOwner},
  task_context::TaskContext,
};
use crate::types::{
  module::{Dependency, ExternalModule, Module},
  module_loader_msg::{ModuleLoaderMsg, NormalModuleTaskResult},
  IndexModules, SharedOptions,
};

pub struct ModuleLoader {
  rx: Receiver<ModuleLoaderMsg>,
  remaining: u32,
  shared_context: Arc<TaskContext>,
  modules: IndexVec<ModuleIdx, Option<Module>>,
  visited: FxHashMap<ArcStr, ModuleIdx>,
}

#[derive(Debug)]
pub struct ModuleLoaderOutput {
  pub modules: IndexModules,
  pub entry: ModuleIdx,
  pub warnings: Vec<anyhow::Error>,
}

impl ModuleLoader {
  pub fn new(options: SharedOptions, plugin_driver: SharedPluginDriver) -> Self {
    // Bounds the results waiting to be linked, not the number of module tasks.
    let (tx, rx) = tokio::sync::mpsc::channel(1024);

    let shared_context = Arc::new(TaskContext { options, plugin_driver, tx });

    Self {
      rx,
      remaining: 0,
      shared_context,
      modules: IndexVec::new(),
      visited: FxHashMap::default(),
    }
  }

  pub async fn fetch_all_modules(mut self, entry: ResolvedId) -> BuildResult<ModuleLoaderOutput> {
    let entry = self.try_spawn_new_task(entry, None, true);

    let mut errors: Vec<anyhow::Error> = vec![];
    let mut warnings: Vec<anyhow::Error> = vec![];

    while self.remaining > 0 {
      let Some(msg) = self.rx.recv().await else {
        break;
      };

      match msg {
        ModuleLoaderMsg::NormalModuleDone(task_result) => {
          let NormalModuleTaskResult { mut module, resolved_deps, warnings: task_warnings } =
            *task_result;
          warnings.extend(task_warnings);

          for (specifier, resolved_id, kind) in resolved_deps {
            let owner = ModuleTaskOwner::new(module.stable_id.clone());
            let idx = self.try_spawn_new_task(resolved_id, Some(owner), false);
            module.dependencies.insert(specifier, Dependency { idx, kind });
          }

          let idx = module.idx;
          self.modules[idx] = Some(Module::Normal(Box::new(module)));
          self.remaining -= 1;
        }
        ModuleLoaderMsg::BuildErrors(errs) => {
          errors.extend(errs);
          self.remaining -= 1;
        }
      }
    }

    if !errors.is_empty() {
      return Err(errors.into());
    }

    let modules = self
      .modules
      .into_iter()
      .collect::<Option<IndexModules>>()
      .ok_or_else(|| anyhow::anyhow!("Module tasks didn't complete as expected"))?;

    Ok(ModuleLoaderOutput { modules, entry, warnings })
  }

  fn try_spawn_new_task(
    &mut self,
    resolved_id: ResolvedId,
    owner: Option<ModuleTaskOwner>,
    is_user_defined_entry: bool,
  ) -> ModuleIdx {
    match self.visited.entry(ArcStr::clone(&resolved_id.id)) {
      Entry::Occupied(visited) => *visited.get(),
      Entry::Vacant(not_visited) => {
        let idx = self.modules.push(None);

        if resolved_id.is_external {
          self.modules[idx] = Some(Module::External(ExternalModule { idx, name: resolved_id.id }));
        } else {
          self.remaining += 1;

          let task = ModuleTask::new(
            Arc::clone(&self.shared_context),
            idx,
            owner,
            resolved_id,
            is_user_defined_entry,
          );

          tokio::spawn(task.run());
        }

        *not_visited.insert(idx)
      }
    }
  }
}
