mod render_entry;
mod render_module;
mod runtime;
mod sort_modules;

use itertools::Itertools;
use module_build_common::{
  ModuleIdx, NormalizedOutputOptions, OutputAsset, RenderedChunk, RenderedModule,
};
use module_build_error::BuildResult;
use module_build_sourcemap::{finalize_sourcemap, parse_sourcemap, SourceJoiner, SourceMapSource};
use rustc_hash::FxHashSet;

use self::{
  render_entry::render_entry,
  render_module::{quote, render_module, RenderedModuleParts},
  runtime::RUNTIME,
  sort_modules::SortModulesReturn,
};
use crate::types::{
  module::{ImportKind, Module, NormalModule},
  IndexModules,
};

pub struct GenerateOutput {
  /// The bundle first, then its source map when one is requested.
  pub assets: Vec<OutputAsset>,
  pub chunk: RenderedChunk,
  pub warnings: Vec<anyhow::Error>,
}

/// Renders the module graph into a single ESM file.
pub struct GenerateStage<'a> {
  output_options: &'a NormalizedOutputOptions,
  modules: &'a IndexModules,
  entry: ModuleIdx,
}

impl<'a> GenerateStage<'a> {
  pub fn new(
    output_options: &'a NormalizedOutputOptions,
    modules: &'a IndexModules,
    entry: ModuleIdx,
  ) -> Self {
    Self { output_options, modules, entry }
  }

  pub fn generate(&self) -> BuildResult<GenerateOutput> {
    let Module::Normal(entry) = &self.modules[self.entry] else {
      return Err(anyhow::anyhow!("The entry module cannot be external").into());
    };

    let SortModulesReturn { sorted_modules, warnings } = self.sort_modules();

    let mut source_joiner = SourceJoiner::default();
    source_joiner.append_source(self.render_prelude());

    let mut rendered_modules = Vec::with_capacity(sorted_modules.len());
    for idx in sorted_modules {
      let Some(module) = self.modules[idx].as_normal().filter(|module| module.idx != self.entry)
      else {
        continue;
      };
      let parts = render_module(module, self.modules);
      rendered_modules
        .push(RenderedModule { id: module.id.clone(), rendered_length: parts.rendered_length() });
      self.append_module(&mut source_joiner, module, parts)?;
    }

    // Last, so every factory is registered before the entry runs.
    let rendered_entry = render_entry(entry, self.modules);
    rendered_modules.push(RenderedModule {
      id: entry.id.clone(),
      rendered_length: rendered_entry.parts.rendered_length(),
    });
    self.append_module(&mut source_joiner, entry, rendered_entry.parts)?;

    let (mut code, map) = source_joiner.join();
    let file_name = self.output_options.file_name();
    let mut assets = vec![];

    if self.output_options.sourcemap {
      let map_file_name = format!("{file_name}.map");
      let map_json = match map {
        Some(map) => finalize_sourcemap(&map, &file_name, &self.output_options.dir)?,
        None => serde_json::json!({
          "version": 3,
          "file": file_name,
          "sources": [],
          "names": [],
          "mappings": "",
        })
        .to_string(),
      };
      code.push_str(&format!("\n//# sourceMappingURL={map_file_name}"));
      code.push('\n');
      assets.push(OutputAsset { filename: file_name.clone(), content: code });
      assets.push(OutputAsset { filename: map_file_name, content: map_json });
    } else {
      code.push('\n');
      assets.push(OutputAsset { filename: file_name.clone(), content: code });
    }

    let chunk = RenderedChunk {
      filename: file_name,
      facade_module_id: entry.id.clone(),
      modules: rendered_modules,
      exports: rendered_entry.exports,
    };

    Ok(GenerateOutput { assets, chunk, warnings })
  }

  fn append_module(
    &self,
    source_joiner: &mut SourceJoiner<'_>,
    module: &NormalModule,
    parts: RenderedModuleParts,
  ) -> BuildResult<()> {
    source_joiner.append_source(parts.header);
    match module.map.as_deref().filter(|_| self.output_options.sourcemap) {
      Some(map) => {
        let map = parse_sourcemap(map)
          .map_err(|error| error.context(format!("Source map of {}", module.stable_id)))?;
        source_joiner.append_source(SourceMapSource::new(parts.body, map));
      }
      None => source_joiner.append_source(parts.body),
    }
    source_joiner.append_source(parts.footer);
    Ok(())
  }

  /// External imports, the `__externals` table and the runtime. Externals only reached through
  /// `import()` stay dynamic imports in the module code.
  fn render_prelude(&self) -> String {
    let statically_imported = self
      .modules
      .iter()
      .filter_map(Module::as_normal)
      .flat_map(|module| module.dependencies.values())
      .filter(|dependency| dependency.kind == ImportKind::Static)
      .map(|dependency| dependency.idx)
      .collect::<FxHashSet<_>>();

    let externals = self
      .modules
      .iter()
      .filter_map(|module| match module {
        Module::External(external) if statically_imported.contains(&external.idx) => {
          Some(external)
        }
        _ => None,
      })
      .collect::<Vec<_>>();

    let mut prelude = String::new();
    for (index, external) in externals.iter().enumerate() {
      prelude.push_str(&format!("import * as __external_{index} from {};\n", quote(&external.name)));
    }
    let table = externals
      .iter()
      .enumerate()
      .map(|(index, external)| format!("{}: __external_{index}", quote(&external.name)))
      .join(", ");
    if table.is_empty() {
      prelude.push_str("const __externals = {};\n");
    } else {
      prelude.push_str(&format!("const __externals = {{ {table} }};\n"));
    }
    prelude.push_str(RUNTIME);
    prelude
  }
}
