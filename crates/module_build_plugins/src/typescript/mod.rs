mod declarations;

use std::{
  borrow::Cow,
  path::{Path, PathBuf},
  sync::{Mutex, PoisonError},
};

use module_build_ecmascript::{DeclarationOutput, ESTarget, EcmaCompiler, TransformConfig};
use module_build_plugin::{
  HookGenerateBundleArgs, HookNoopReturn, HookTransformArgs, HookTransformOutput,
  HookTransformReturn, Plugin, PluginContext,
};
use rustc_hash::FxHashMap;

use crate::{has_extension, join_errors};

const EXTENSIONS: [&str; 5] = ["ts", "tsx", "mts", "cts", "jsx"];

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone)]
pub struct TypeScriptOptions {
  pub declaration: bool,
  pub declaration_map: bool,
  /// Report semantic errors such as duplicate declarations.
  pub strict: bool,
  pub no_unused_locals: bool,
  pub no_unused_parameters: bool,
  /// Accepted for compatibility. Checking it needs type information that a per-file transform
  /// does not have.
  pub no_implicit_returns: bool,
  /// Every file is transformed on its own, which is always the case here.
  pub isolated_modules: bool,
  pub target: ESTarget,
  pub source_map: bool,
  /// Declarations of files below `root_dir` keep their relative path in the output directory.
  pub root_dir: PathBuf,
}

impl Default for TypeScriptOptions {
  fn default() -> Self {
    Self {
      declaration: false,
      declaration_map: false,
      strict: false,
      no_unused_locals: false,
      no_unused_parameters: false,
      no_implicit_returns: false,
      isolated_modules: true,
      target: ESTarget::EsNext,
      source_map: false,
      root_dir: PathBuf::from("src"),
    }
  }
}

/// Compiles TypeScript and JSX to JavaScript and emits `.d.ts` files for the bundled modules and
/// the modules their declarations reference.
#[derive(Debug)]
pub struct TypeScriptPlugin {
  options: TypeScriptOptions,
  /// Declarations of the current pass, keyed by module id.
  declarations: Mutex<FxHashMap<String, DeclarationOutput>>,
}

impl TypeScriptPlugin {
  pub fn new(options: TypeScriptOptions) -> Self {
    Self { options, declarations: Mutex::default() }
  }

  fn transform_config(&self) -> TransformConfig {
    TransformConfig {
      target: self.options.target,
      strict: self.options.strict,
      no_unused_locals: self.options.no_unused_locals,
      no_unused_parameters: self.options.no_unused_parameters,
      declaration: self.options.declaration,
      declaration_map: self.options.declaration && self.options.declaration_map,
      sourcemap: self.options.source_map,
    }
  }
}

impl Plugin for TypeScriptPlugin {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("typescript")
  }

  fn build_start(&self, _ctx: &PluginContext) -> HookNoopReturn {
    self.declarations.lock().unwrap_or_else(PoisonError::into_inner).clear();
    Ok(())
  }

  fn transform(&self, ctx: &PluginContext, args: &HookTransformArgs<'_>) -> HookTransformReturn {
    if !has_extension(args.id, &EXTENSIONS) || args.id.ends_with(".d.ts") {
      return Ok(None);
    }

    let output = EcmaCompiler::transform(args.code, Path::new(args.id), &self.transform_config())
      .map_err(|errors| join_errors(&errors))?;

    for warning in &output.warnings {
      ctx.warn(warning);
    }
    if let Some(declaration) = output.declaration {
      self
        .declarations
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(args.id.to_string(), declaration);
    }

    Ok(Some(HookTransformOutput {
      code: Some(output.code),
      map: output.map,
      ..HookTransformOutput::default()
    }))
  }

  fn generate_bundle(
    &self,
    ctx: &PluginContext,
    args: &mut HookGenerateBundleArgs<'_>,
  ) -> HookNoopReturn {
    if !self.options.declaration {
      return Ok(());
    }

    let mut declarations = self.declarations.lock().unwrap_or_else(PoisonError::into_inner);
    let referenced =
      declarations::load_referenced(&mut declarations, args.chunk, self.options.declaration_map)?;
    for warning in &referenced.warnings {
      ctx.warn(warning);
    }

    let root_dir = ctx.cwd().join(&self.options.root_dir);
    let emitted = declarations::emit_declarations(&declarations::EmitContext {
      declarations: &declarations,
      chunk: args.chunk,
      referenced: &referenced.ids,
      output: args.options,
      root_dir: &root_dir,
      with_maps: self.options.declaration_map,
    })?;

    for skipped in &emitted.skipped {
      ctx.warn(&format!("No declaration emitted for {skipped}, it is outside {}", root_dir.display()));
    }
    for (module, filename) in &emitted.collisions {
      ctx.warn(&format!("No declaration emitted for {module}, {filename} is already written for another module"));
    }
    args.assets.extend(emitted.assets);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
  };

  use module_build_common::{
    LogLevel, ModuleId, NormalizedOutputOptions, OnLog, OutputAsset, OutputFormat, RenderedChunk,
    RenderedModule,
  };
  use module_build_plugin::{HookGenerateBundleArgs, HookTransformArgs, Plugin, PluginContext};

  use super::{TypeScriptOptions, TypeScriptPlugin};

  fn options() -> TypeScriptOptions {
    TypeScriptOptions {
      declaration: true,
      declaration_map: true,
      strict: true,
      no_unused_locals: true,
      no_unused_parameters: true,
      source_map: true,
      ..TypeScriptOptions::default()
    }
  }

  fn ctx() -> PluginContext {
    PluginContext::new(PathBuf::from("/project"), None, Cow::Borrowed("typescript"))
  }

  fn chunk(entry: &str, modules: &[&str]) -> RenderedChunk {
    RenderedChunk {
      filename: "index.js".to_string(),
      facade_module_id: ModuleId::from(entry),
      modules: modules
        .iter()
        .map(|id| RenderedModule { id: ModuleId::from(*id), rendered_length: 10 })
        .collect(),
      exports: vec![],
    }
  }

  fn output_options(dir: &Path) -> NormalizedOutputOptions {
    NormalizedOutputOptions {
      file: dir.join("index.js"),
      dir: dir.to_path_buf(),
      format: OutputFormat::Esm,
      sourcemap: true,
    }
  }

  /// Runs `generate_bundle` and returns the assets and the warnings it reported.
  fn generate(
    plugin: &TypeScriptPlugin,
    cwd: &Path,
    chunk: &RenderedChunk,
    output: &NormalizedOutputOptions,
  ) -> (Vec<OutputAsset>, Vec<String>) {
    let warnings = Arc::new(Mutex::new(vec![]));
    let sink = Arc::clone(&warnings);
    let on_log = OnLog::new(move |level: LogLevel, message: &str| {
      if level == LogLevel::Warn {
        sink.lock().unwrap().push(message.to_string());
      }
    });
    let ctx = PluginContext::new(cwd.to_path_buf(), Some(on_log), plugin.name());

    let mut assets = vec![];
    plugin
      .generate_bundle(
        &ctx,
        &mut HookGenerateBundleArgs { is_write: true, options: output, chunk, assets: &mut assets },
      )
      .unwrap();
    let warnings = warnings.lock().unwrap().clone();
    (assets, warnings)
  }

  #[test]
  fn transform_strips_types_and_keeps_a_map() {
    let plugin = TypeScriptPlugin::new(options());
    let output = plugin
      .transform(
        &ctx(),
        &HookTransformArgs {
          id: "/project/src/index.ts",
          code: "export function pad(value: string, width: number): string {\n  return value.padStart(width);\n}\n",
        },
      )
      .unwrap()
      .unwrap();

    let code = output.code.unwrap();
    assert!(code.contains("export function pad(value, width)"));
    assert!(output.map.is_some());
  }

  #[test]
  fn unused_parameters_fail_the_module() {
    let plugin = TypeScriptPlugin::new(options());
    let error = plugin
      .transform(
        &ctx(),
        &HookTransformArgs {
          id: "/project/src/index.ts",
          code: "export function f(used: number, unused: number): number {\n  return used;\n}\n",
        },
      )
      .unwrap_err();
    assert!(error.to_string().contains("'unused' is declared but its value is never read."));
  }

  #[test]
  fn skips_javascript() {
    let plugin = TypeScriptPlugin::new(options());
    let output = plugin
      .transform(&ctx(), &HookTransformArgs { id: "/project/src/index.js", code: "export {};\n" })
      .unwrap();
    assert!(output.is_none());
  }

  #[test]
  fn emits_declarations_for_bundled_modules() {
    let plugin = TypeScriptPlugin::new(options());
    for (id, code) in [
      ("/project/src/index.ts", "export { helper } from \"./lib/helper\";\nexport const answer: number = 42;\n"),
      ("/project/src/lib/helper.ts", "export function helper(): string {\n  return \"help\";\n}\n"),
      ("/project/src/unused.ts", "export const unused: number = 1;\n"),
    ] {
      plugin.transform(&ctx(), &HookTransformArgs { id, code }).unwrap();
    }

    let chunk = RenderedChunk {
      filename: "index.js".to_string(),
      facade_module_id: ModuleId::from("/project/src/index.ts"),
      modules: ["/project/src/lib/helper.ts", "/project/src/index.ts"]
        .into_iter()
        .map(|id| RenderedModule { id: ModuleId::from(id), rendered_length: 10 })
        .collect(),
      exports: vec!["helper".to_string(), "answer".to_string()],
    };
    let output_options = NormalizedOutputOptions {
      file: PathBuf::from("/project/dist/index.js"),
      dir: PathBuf::from("/project/dist"),
      format: OutputFormat::Esm,
      sourcemap: true,
    };
    let mut assets: Vec<OutputAsset> = vec![];
    plugin
      .generate_bundle(
        &ctx(),
        &mut HookGenerateBundleArgs {
          is_write: true,
          options: &output_options,
          chunk: &chunk,
          assets: &mut assets,
        },
      )
      .unwrap();

    let names = assets.iter().map(OutputAsset::filename).collect::<Vec<_>>();
    assert_eq!(names, vec!["lib/helper.d.ts", "lib/helper.d.ts.map", "index.d.ts", "index.d.ts.map"]);

    let index = &assets[2].content;
    assert!(index.contains("export declare const answer: number;"));
    assert!(index.ends_with("//# sourceMappingURL=index.d.ts.map\n"));

    let map: serde_json::Value = serde_json::from_str(&assets[3].content).unwrap();
    assert_eq!(map["file"], "index.d.ts");
    assert_eq!(map["sources"][0], "../src/index.ts");
  }

  #[test]
  fn emits_declarations_of_type_only_modules() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let files = [
      ("src/index.ts", "import type { Opts } from \"./types\";\nexport type { Shape } from \"./shapes\";\nexport function pad(value: string, opts: Opts): string {\n  return value.padStart(opts.width);\n}\n"),
      ("src/types.ts", "import type { Unit } from \"./units.js\";\nexport interface Opts {\n  width: number;\n  unit: Unit;\n}\n"),
      ("src/units.d.ts", "export type Unit = \"ch\" | \"px\";\n"),
      ("src/shapes/index.ts", "export interface Shape {\n  sides: number;\n}\n"),
    ];
    for (file, code) in files {
      std::fs::create_dir_all(root.join(file).parent().unwrap()).unwrap();
      std::fs::write(root.join(file), code).unwrap();
    }

    let plugin = TypeScriptPlugin::new(options());
    let entry = root.join("src/index.ts").to_string_lossy().into_owned();
    plugin
      .transform(&ctx(), &HookTransformArgs { id: &entry, code: files[0].1 })
      .unwrap();

    let (assets, warnings) =
      generate(&plugin, root, &chunk(&entry, &[&entry]), &output_options(&root.join("dist")));
    assert!(warnings.is_empty(), "{warnings:?}");

    let names = assets.iter().map(OutputAsset::filename).collect::<Vec<_>>();
    assert_eq!(
      names,
      vec![
        "index.d.ts",
        "index.d.ts.map",
        "types.d.ts",
        "types.d.ts.map",
        "shapes/index.d.ts",
        "shapes/index.d.ts.map",
        "units.d.ts",
      ]
    );
    assert!(assets[2].content.contains("export interface Opts"));
    assert_eq!(assets[6].content, files[2].1);
  }

  #[test]
  fn declaration_name_collisions_keep_the_entry() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let plugin = TypeScriptPlugin::new(options());
    let main = root.join("src/main.ts").to_string_lossy().into_owned();
    let index = root.join("src/index.ts").to_string_lossy().into_owned();
    for (id, code) in [
      (main.as_str(), "export { helper } from \"./index\";\n"),
      (index.as_str(), "export function helper(): number {\n  return 1;\n}\n"),
    ] {
      plugin.transform(&ctx(), &HookTransformArgs { id, code }).unwrap();
    }

    let (assets, warnings) =
      generate(&plugin, root, &chunk(&main, &[&index, &main]), &output_options(&root.join("dist")));

    let names = assets.iter().map(OutputAsset::filename).collect::<Vec<_>>();
    assert_eq!(names, vec!["index.d.ts", "index.d.ts.map"]);
    assert!(assets[0].content.contains("export { helper } from \"./index\""));
    assert_eq!(
      warnings,
      vec!["No declaration emitted for index.ts, index.d.ts is already written for another module"]
    );
  }
}
