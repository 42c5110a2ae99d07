use module_build_common::{ModuleFormat, ModuleIdx};
use module_build_ecmascript::{is_validate_identifier_name, to_module_import_export_name};
use rustc_hash::FxHashSet;

use super::render_module::{
  dependency_table, getter_list, member, quote, render_module, rewrite_esm, RenderedModuleParts,
};
use crate::types::{
  module::{Module, NormalModule},
  IndexModules,
};

pub struct RenderedEntry {
  pub parts: RenderedModuleParts,
  /// Names the bundle exports, in output order.
  pub exports: Vec<String>,
}

/// Renders the entry as the bundle's own top-level code. An ESM entry is not wrapped in a
/// factory: its exports are exported through its own bindings, so they stay live. It registers
/// itself in `__cache` first, so modules importing it back see the same exports object.
pub fn render_entry(entry: &NormalModule, modules: &IndexModules) -> RenderedEntry {
  if entry.format == ModuleFormat::CommonJs {
    let mut parts = render_module(entry, modules);
    parts.footer.push_str(&format!("\nexport default __load({});", quote(&entry.stable_id)));
    return RenderedEntry { parts, exports: vec!["default".to_string()] };
  }

  let (body, getters) = rewrite_esm(entry, modules);
  let header = format!(
    "const __module = {{ exports: {{}} }}; const __exports = __module.exports; __cache[{}] = __module; const __dependencies = {{ {} }}; const require = (specifier) => __load(Object.prototype.hasOwnProperty.call(__dependencies, specifier) ? __dependencies[specifier] : specifier); __export(__exports, {{ {} }});",
    quote(&entry.stable_id),
    dependency_table(entry, modules),
    getter_list(&getters),
  );

  let mut collector = ExportCollector::default();
  collector.collect(entry, modules, true);

  let mut footer = vec![];
  let mut specifiers = vec![];
  for name in &collector.names {
    let exported = to_module_import_export_name(name);
    match getters.iter().find(|(getter, _)| getter == name).map(|(_, local)| local) {
      Some(local) if is_validate_identifier_name(local) => {
        specifiers.push(if local == name { exported } else { format!("{local} as {exported}") });
      }
      // Re-exported from another module: read once the entry has run.
      _ => {
        let binding = format!("__export_{}", footer.len());
        footer.push(format!("const {binding} = __exports{};", member(name)));
        specifiers.push(format!("{binding} as {exported}"));
      }
    }
  }
  if !specifiers.is_empty() {
    footer.push(format!("export {{ {} }};", specifiers.join(", ")));
  }
  for external in &collector.external_stars {
    footer.push(format!("export * from {};", quote(external)));
  }

  RenderedEntry {
    parts: RenderedModuleParts {
      header,
      body: body.trim_end_matches('\n').to_string(),
      footer: footer.join("\n"),
    },
    exports: collector.names,
  }
}

#[derive(Default)]
struct ExportCollector {
  names: Vec<String>,
  external_stars: Vec<String>,
  visited: FxHashSet<ModuleIdx>,
}

impl ExportCollector {
  /// `export *` never forwards `default`, and names found first shadow later ones.
  fn collect(&mut self, module: &NormalModule, modules: &IndexModules, is_entry: bool) {
    if !self.visited.insert(module.idx) || module.format == ModuleFormat::CommonJs {
      return;
    }

    for name in module.syntax.export_names() {
      if (is_entry || name != "default") && !self.names.contains(&name) {
        self.names.push(name);
      }
    }

    for specifier in module.syntax.star_reexports() {
      let Some(dependency) = module.dependencies.get(specifier) else { continue };
      match &modules[dependency.idx] {
        Module::Normal(star) => self.collect(star, modules, false),
        Module::External(external) => {
          if !self.external_stars.iter().any(|name| name == external.name.as_str()) {
            self.external_stars.push(external.name.to_string());
          }
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use arcstr::ArcStr;
  use indexmap::IndexMap;
  use module_build_common::{ModuleFormat, ModuleId, ModuleIdx};
  use module_build_ecmascript::EcmaCompiler;

  use super::render_entry;
  use crate::types::{
    module::{Dependency, ExternalModule, ImportKind, Module, NormalModule},
    IndexModules,
  };

  fn normal(idx: usize, stable_id: &str, code: &str, deps: &[(&str, usize)]) -> Module {
    Module::Normal(Box::new(NormalModule {
      idx: ModuleIdx::from_usize(idx),
      id: ModuleId::new(format!("/project/{stable_id}")),
      stable_id: stable_id.to_string(),
      is_entry: idx == 0,
      code: ArcStr::from(code),
      map: None,
      format: ModuleFormat::Esm,
      syntax: EcmaCompiler::scan(code, Path::new(stable_id)).unwrap(),
      dependencies: deps
        .iter()
        .map(|(specifier, idx)| {
          let dependency =
            Dependency { idx: ModuleIdx::from_usize(*idx), kind: ImportKind::Static };
          ((*specifier).to_string(), dependency)
        })
        .collect::<IndexMap<_, _>>(),
    }))
  }

  fn entry(modules: &IndexModules) -> &NormalModule {
    let Module::Normal(entry) = &modules[ModuleIdx::from_usize(0)] else { unreachable!() };
    entry
  }

  #[test]
  fn reexports_through_stars() {
    let modules: IndexModules = [
      normal(
        0,
        "src/index.js",
        "export * from \"./a\";\nexport * from \"left-pad\";\nexport const b = 1;\nexport default b;\n",
        &[("./a", 1), ("left-pad", 2)],
      ),
      normal(1, "src/a.js", "export const a = 1;\nexport const b = 2;\nexport default a;\n", &[]),
      Module::External(ExternalModule {
        idx: ModuleIdx::from_usize(2),
        name: ArcStr::from("left-pad"),
      }),
    ]
    .into_iter()
    .collect();

    let rendered = render_entry(entry(&modules), &modules);

    assert_eq!(rendered.exports, vec!["b", "default", "a"]);
    assert!(rendered.parts.header.starts_with(
      "const __module = { exports: {} }; const __exports = __module.exports; __cache[\"src/index.js\"] = __module; const __dependencies = { \"./a\": \"src/a.js\", \"left-pad\": \"left-pad\" };"
    ));
    assert!(rendered.parts.header.ends_with("__export(__exports, { b: () => b, default: () => __default });"));
    assert_eq!(
      rendered.parts.body,
      "__exportStar(__exports, require(\"./a\"));\n__exportStar(__exports, require(\"left-pad\"));\nconst b = 1;\nconst __default = b;"
    );
    assert_eq!(
      rendered.parts.footer,
      "const __export_0 = __exports.a;\nexport { b, __default as default, __export_0 as a };\nexport * from \"left-pad\";"
    );
  }

  #[test]
  fn local_exports_keep_their_bindings() {
    let code = "let counter = 0;\nexport function inc() {\n  counter++;\n}\nexport { counter as count };\n";
    let modules: IndexModules = [normal(0, "src/index.js", code, &[])].into_iter().collect();

    let rendered = render_entry(entry(&modules), &modules);

    assert_eq!(rendered.exports, vec!["inc", "count"]);
    assert_eq!(rendered.parts.body, "let counter = 0;\nfunction inc() {\n  counter++;\n}");
    assert_eq!(rendered.parts.footer, "export { inc, counter as count };");
  }

  #[test]
  fn commonjs_entry_is_the_default_export() {
    let mut module = normal(0, "src/index.js", "module.exports = 1;\n", &[]);
    if let Module::Normal(normal) = &mut module {
      normal.format = ModuleFormat::CommonJs;
    }
    let modules: IndexModules = [module].into_iter().collect();

    let rendered = render_entry(entry(&modules), &modules);
    assert_eq!(rendered.exports, vec!["default"]);
    assert_eq!(rendered.parts.footer, "}, {  }];\nexport default __load(\"src/index.js\");");
  }
}
