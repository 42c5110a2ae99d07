use std::iter;

use module_build_common::ModuleIdx;
use rustc_hash::{FxHashMap, FxHashSet};

use super::GenerateStage;
use crate::types::module::{ImportKind, Module};

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
enum Status {
  ToBeExecuted(ModuleIdx),
  WaitForExit(ModuleIdx),
}

pub struct SortModulesReturn {
  /// Internal modules, dependencies before their importers. Modules that are only reachable
  /// through `import()` follow the statically reachable ones.
  pub sorted_modules: Vec<ModuleIdx>,
  pub warnings: Vec<anyhow::Error>,
}

impl GenerateStage<'_> {
  pub(crate) fn sort_modules(&self) -> SortModulesReturn {
    let mut executed_ids = FxHashSet::default();
    let mut stack_indexes_of_executing_id = FxHashMap::default();
    let mut circular_dependencies = FxHashSet::default();
    let mut sorted_modules = Vec::with_capacity(self.modules.len());

    let mut roots = vec![self.entry];
    while !roots.is_empty() {
      let mut execution_stack =
        roots.drain(..).rev().map(Status::ToBeExecuted).collect::<Vec<_>>();
      let first_new_module = sorted_modules.len();

      while let Some(status) = execution_stack.pop() {
        match status {
          Status::ToBeExecuted(id) => {
            if executed_ids.contains(&id) {
              // Try to check if there is a circular dependency
              if let Some(index) = stack_indexes_of_executing_id.get(&id).copied() {
                let cycles = execution_stack[index..]
                  .iter()
                  .filter_map(|action| match action {
                    // Only modules with `Status::WaitForExit` are on the execution chain
                    Status::ToBeExecuted(_) => None,
                    Status::WaitForExit(id) => Some(*id),
                  })
                  .chain(iter::once(id))
                  .collect::<Box<[_]>>();
                circular_dependencies.insert(cycles);
              }
            } else {
              executed_ids.insert(id);
              execution_stack.push(Status::WaitForExit(id));
              stack_indexes_of_executing_id.insert(id, execution_stack.len() - 1);

              if let Module::Normal(module) = &self.modules[id] {
                execution_stack.extend(
                  module
                    .dependencies
                    .values()
                    .filter(|dependency| dependency.kind == ImportKind::Static)
                    .map(|dependency| dependency.idx)
                    .rev()
                    .map(Status::ToBeExecuted),
                );
              }
            }
          }
          Status::WaitForExit(id) => {
            if !self.modules[id].is_external() {
              sorted_modules.push(id);
            }
            stack_indexes_of_executing_id.remove(&id);
          }
        }
      }

      // Modules reached through `import()` are rendered too, after everything already sorted.
      for idx in &sorted_modules[first_new_module..] {
        let Some(module) = self.modules[*idx].as_normal() else { continue };
        for dependency in module.dependencies.values() {
          if dependency.kind == ImportKind::Dynamic
            && !executed_ids.contains(&dependency.idx)
            && !roots.contains(&dependency.idx)
          {
            roots.push(dependency.idx);
          }
        }
      }
    }

    let mut circular_dependencies = circular_dependencies.into_iter().collect::<Vec<_>>();
    circular_dependencies.sort();
    let warnings = circular_dependencies
      .into_iter()
      .map(|cycle| {
        let paths = cycle
          .iter()
          .copied()
          .filter_map(|id| self.modules[id].as_normal())
          .map(|module| module.stable_id.as_str())
          .collect::<Vec<_>>();
        anyhow::anyhow!("Circular dependency: {}.", paths.join(" -> "))
      })
      .collect();

    SortModulesReturn { sorted_modules, warnings }
  }
}
