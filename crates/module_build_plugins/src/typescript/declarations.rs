use std::{
  collections::VecDeque,
  ffi::OsString,
  path::{Component, Path, PathBuf},
};

use anyhow::Context;
use module_build_common::{ModuleId, NormalizedOutputOptions, OutputAsset, RenderedChunk};
use module_build_ecmascript::{DeclarationOutput, EcmaCompiler};
use module_build_sourcemap::{finalize_sourcemap, parse_sourcemap};
use rustc_hash::FxHashMap;
use sugar_path::SugarPath;

use crate::join_errors;

pub struct EmitContext<'a> {
  pub declarations: &'a FxHashMap<String, DeclarationOutput>,
  pub chunk: &'a RenderedChunk,
  /// Modules that are not bundled but whose declarations are referenced, see [`load_referenced`].
  pub referenced: &'a [String],
  pub output: &'a NormalizedOutputOptions,
  pub root_dir: &'a Path,
  pub with_maps: bool,
}

#[derive(Default)]
pub struct EmittedDeclarations {
  pub assets: Vec<OutputAsset>,
  /// Modules whose declaration has no place in the output directory.
  pub skipped: Vec<String>,
  /// `(module, file name)` of declarations dropped because another module, the entry first, already
  /// owns the file name.
  pub collisions: Vec<(String, String)>,
}

#[derive(Default)]
pub struct ReferencedDeclarations {
  /// Ids of the loaded modules, in the order they were reached.
  pub ids: Vec<String>,
  pub warnings: Vec<String>,
}

/// Declarations of modules that the bundled declarations reference but that were never bundled,
/// such as modules imported only for their types. References are followed until every reachable
/// relative module has a declaration.
pub fn load_referenced(
  declarations: &mut FxHashMap<String, DeclarationOutput>,
  chunk: &RenderedChunk,
  with_maps: bool,
) -> anyhow::Result<ReferencedDeclarations> {
  let mut loaded = ReferencedDeclarations::default();
  let mut queue = chunk
    .modules
    .iter()
    .map(|module| module.id.to_string())
    .filter(|id| declarations.contains_key(id))
    .collect::<VecDeque<_>>();

  while let Some(importer) = queue.pop_front() {
    let Some(declaration) = declarations.get(&importer) else { continue };
    let specifiers = declaration
      .references
      .iter()
      .filter(|specifier| specifier.starts_with("./") || specifier.starts_with("../"))
      .cloned()
      .collect::<Vec<_>>();

    for specifier in specifiers {
      let known = |path: &Path| {
        declarations.contains_key(path.to_string_lossy().as_ref()) || path.is_file()
      };
      let Some(path) = resolve_declaration_source(Path::new(&importer), &specifier, known) else {
        loaded.warnings.push(format!(
          "Could not find a TypeScript source for \"{specifier}\" referenced by the declaration of {importer}"
        ));
        continue;
      };
      let id = path.to_string_lossy().into_owned();
      if declarations.contains_key(&id) {
        continue;
      }

      let source =
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {id}"))?;
      let (declaration, warnings) =
        EcmaCompiler::declaration(&source, &path, with_maps).map_err(|errors| join_errors(&errors))?;
      loaded.warnings.extend(warnings);
      declarations.insert(id.clone(), declaration);
      loaded.ids.push(id.clone());
      queue.push_back(id);
    }
  }

  Ok(loaded)
}

/// The file a relative specifier of a declaration points to. TypeScript sources are tried first,
/// `./a.js` also stands for `./a.ts`, and a directory stands for its index.
fn resolve_declaration_source(
  importer: &Path,
  specifier: &str,
  exists: impl Fn(&Path) -> bool,
) -> Option<PathBuf> {
  let base = importer.parent()?.join(specifier).normalize();
  let mut candidates = vec![];

  match base.extension().and_then(|ext| ext.to_str()) {
    Some("ts" | "tsx" | "mts" | "cts") => candidates.push(base.clone()),
    Some(ext @ ("js" | "jsx" | "mjs" | "cjs")) => {
      let ts = match ext {
        "jsx" => "tsx",
        "mjs" => "mts",
        "cjs" => "cts",
        _ => "ts",
      };
      candidates.push(base.with_extension(ts));
      candidates.push(base.with_extension("d.ts"));
    }
    _ => {}
  }
  for suffix in [".ts", ".tsx", ".d.ts"] {
    let mut path = OsString::from(base.as_os_str());
    path.push(suffix);
    candidates.push(PathBuf::from(path));
  }
  for index in ["index.ts", "index.tsx", "index.d.ts"] {
    candidates.push(base.join(index));
  }

  candidates.into_iter().find(|candidate| exists(candidate.as_path()))
}

/// `.d.ts` files (and maps) for every bundled module that has a declaration, in bundle order, then
/// for the referenced ones. The entry's declaration is named after the bundle.
pub fn emit_declarations(ctx: &EmitContext<'_>) -> anyhow::Result<EmittedDeclarations> {
  let mut emitted = EmittedDeclarations::default();
  let entry = ctx.chunk.facade_module_id.as_ref();
  let entry_filename = {
    let stem = ctx.output.file.file_stem().map(|stem| stem.to_string_lossy().into_owned());
    format!("{}.d.ts", stem.unwrap_or_else(|| "index".to_string()))
  };

  let mut owners = FxHashMap::<String, String>::default();
  if ctx.declarations.contains_key(entry) {
    owners.insert(entry_filename.clone(), entry.to_string());
  }

  let ids = ctx
    .chunk
    .modules
    .iter()
    .map(|module| module.id.as_ref())
    .chain(ctx.referenced.iter().map(String::as_str));

  for id in ids {
    let Some(declaration) = ctx.declarations.get(id) else { continue };

    let filename = if id == entry {
      entry_filename.clone()
    } else {
      let relative = Path::new(id).relative(ctx.root_dir);
      if relative.components().any(|component| component == Component::ParentDir) {
        emitted.skipped.push(ModuleId::from(id).stabilize(ctx.root_dir));
        continue;
      }
      let filename = declaration_file_name(&relative);
      if owners.contains_key(&filename) {
        emitted.collisions.push((ModuleId::from(id).stabilize(ctx.root_dir), filename));
        continue;
      }
      owners.insert(filename.clone(), id.to_string());
      filename
    };

    let mut code = declaration.code.clone();
    let map = match declaration.map.as_deref().filter(|_| ctx.with_maps) {
      Some(map) => {
        let path = ctx.output.dir.join(&filename);
        let dir = path.parent().unwrap_or(&ctx.output.dir);
        let base_name = path.file_name().map(|name| name.to_string_lossy().into_owned());
        let base_name = base_name.unwrap_or_else(|| filename.clone());

        let map = finalize_sourcemap(&parse_sourcemap(map)?, &base_name, dir)?;
        if !code.ends_with('\n') {
          code.push('\n');
        }
        code.push_str(&format!("//# sourceMappingURL={base_name}.map\n"));
        Some(OutputAsset { filename: format!("{filename}.map"), content: map })
      }
      None => None,
    };

    emitted.assets.push(OutputAsset { filename, content: code });
    emitted.assets.extend(map);
  }

  Ok(emitted)
}

/// `lib/a.ts` becomes `lib/a.d.ts`; a hand-written `lib/a.d.ts` keeps its name.
fn declaration_file_name(relative: &Path) -> String {
  let slash = relative.to_slash_lossy();
  if slash.ends_with(".d.ts") {
    return slash.into_owned();
  }
  relative.with_extension("d.ts").to_slash_lossy().into_owned()
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use super::{declaration_file_name, resolve_declaration_source};

  #[test]
  fn declaration_file_names() {
    assert_eq!(declaration_file_name(Path::new("lib/a.ts")), "lib/a.d.ts");
    assert_eq!(declaration_file_name(Path::new("view.tsx")), "view.d.ts");
    assert_eq!(declaration_file_name(Path::new("types.d.ts")), "types.d.ts");
  }

  #[test]
  fn resolves_typescript_sources() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(src.join("shapes")).unwrap();
    for file in ["types.ts", "util.ts", "env.d.ts", "shapes/index.ts"] {
      std::fs::write(src.join(file), "export {};\n").unwrap();
    }
    let importer = src.join("index.ts");
    let resolve =
      |specifier: &str| resolve_declaration_source(&importer, specifier, |path| path.is_file());

    assert_eq!(resolve("./types"), Some(src.join("types.ts")));
    assert_eq!(resolve("./util.js"), Some(src.join("util.ts")));
    assert_eq!(resolve("./env"), Some(src.join("env.d.ts")));
    assert_eq!(resolve("./shapes"), Some(src.join("shapes/index.ts")));
    assert_eq!(resolve("./missing"), None);

    let bundled = src.join("lib/helper.ts");
    assert_eq!(
      resolve_declaration_source(&importer, "./lib/helper", |path| path == bundled),
      Some(bundled.clone())
    );
  }
}
