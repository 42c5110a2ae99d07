use itertools::Itertools;
use module_build_common::ModuleFormat;
use module_build_ecmascript::{
  is_validate_identifier_name, to_module_import_export_name, ExportStatement, ImportBinding,
};

use crate::{
  types::{module::NormalModule, IndexModules},
  utils::text_edits::TextEdits,
};

/// A module wrapped into its registry entry. `header` and `footer` are single lines around the
/// module's own code, so the code keeps its line structure.
pub struct RenderedModuleParts {
  pub header: String,
  pub body: String,
  pub footer: String,
}

impl RenderedModuleParts {
  pub fn rendered_length(&self) -> usize {
    self.header.len() + self.body.len() + self.footer.len() + 2
  }
}

/// `value` as a JS string literal.
pub fn quote(value: &str) -> String {
  serde_json::Value::String(value.to_string()).to_string()
}

/// `.name`, or `["name"]` when `name` is not an identifier.
pub fn member(name: &str) -> String {
  if is_validate_identifier_name(name) {
    format!(".{name}")
  } else {
    format!("[{}]", quote(name))
  }
}

pub fn render_module(module: &NormalModule, modules: &IndexModules) -> RenderedModuleParts {
  let (header, body) = match module.format {
    ModuleFormat::CommonJs => (
      format!("__modules[{}] = [function (exports, module, require) {{", quote(&module.stable_id)),
      module.code.to_string(),
    ),
    ModuleFormat::Esm => {
      let (body, getters) = rewrite_esm(module, modules);
      let getters = getter_list(&getters);
      (
        format!(
          "__modules[{}] = [function (__exports, __module, require) {{ __export(__exports, {{ {getters} }});",
          quote(&module.stable_id)
        ),
        body,
      )
    }
  };

  RenderedModuleParts {
    header,
    body: body.trim_end_matches('\n').to_string(),
    footer: format!("}}, {{ {} }}];", dependency_table(module, modules)),
  }
}

/// The specifiers a module uses, mapped to registry keys.
pub fn dependency_table(module: &NormalModule, modules: &IndexModules) -> String {
  module
    .dependencies
    .iter()
    .map(|(specifier, dependency)| {
      format!("{}: {}", quote(specifier), quote(modules[dependency.idx].key()))
    })
    .join(", ")
}

/// `name: () => expression` pairs for `__export`.
pub fn getter_list(getters: &[(String, String)]) -> String {
  getters
    .iter()
    .map(|(exported, local)| format!("{}: () => {local}", to_module_import_export_name(exported)))
    .join(", ")
}

/// Rewrites import and export statements into `require` calls and collects the module's exports
/// as `(exported name, expression)` pairs.
pub fn rewrite_esm(module: &NormalModule, modules: &IndexModules) -> (String, Vec<(String, String)>) {
  let syntax = &module.syntax;
  let is_external = |specifier: &str| {
    module.dependencies.get(specifier).is_some_and(|dependency| modules[dependency.idx].is_external())
  };

  let mut edits = TextEdits::default();
  let mut getters = vec![];
  let mut next_binding = 0;
  let mut binding_name = |prefix: &str| {
    let name = format!("{prefix}_{next_binding}");
    next_binding += 1;
    name
  };

  for import in &syntax.imports {
    let source = quote(&import.specifier);
    let content = if import.bindings.is_empty() {
      format!("require({source});")
    } else {
      let binding = binding_name("__import");
      let mut content = format!("const {binding} = require({source});");
      for import_binding in &import.bindings {
        let declaration = match import_binding {
          ImportBinding::Default { local } => format!(" const {local} = __interop({binding}).default;"),
          ImportBinding::Namespace { local } => format!(" const {local} = {binding};"),
          ImportBinding::Named { imported, local } if imported == "default" => {
            format!(" const {local} = __interop({binding}).default;")
          }
          ImportBinding::Named { imported, local } => {
            format!(" const {local} = {binding}{};", member(imported))
          }
        };
        content.push_str(&declaration);
      }
      content
    };
    edits.replace(import.span.start, import.span.end, content);
  }

  for export in &syntax.exports {
    match export {
      ExportStatement::Declaration { keyword_span, names } => {
        edits.remove(keyword_span.start, keyword_span.end);
        getters.extend(names.iter().map(|name| (name.clone(), name.clone())));
      }
      ExportStatement::Local { span, specifiers } => {
        edits.remove(span.start, span.end);
        getters.extend(
          specifiers.iter().map(|specifier| (specifier.exported.clone(), specifier.local.clone())),
        );
      }
      ExportStatement::Reexport { span, specifier, specifiers } => {
        let binding = binding_name("__reexport");
        edits.replace(span.start, span.end, format!("const {binding} = require({});", quote(specifier)));
        getters.extend(specifiers.iter().map(|specifier| {
          let value = if specifier.local == "default" {
            format!("__interop({binding}).default")
          } else {
            format!("{binding}{}", member(&specifier.local))
          };
          (specifier.exported.clone(), value)
        }));
      }
      ExportStatement::Star { span, specifier, alias: None } => {
        edits.replace(
          span.start,
          span.end,
          format!("__exportStar(__exports, require({}));", quote(specifier)),
        );
      }
      ExportStatement::Star { span, specifier, alias: Some(alias) } => {
        let binding = binding_name("__reexport");
        edits.replace(span.start, span.end, format!("const {binding} = require({});", quote(specifier)));
        getters.push((alias.clone(), binding));
      }
      ExportStatement::Default { keyword_span, local: Some(local), .. } => {
        edits.remove(keyword_span.start, keyword_span.end);
        getters.push(("default".to_string(), local.clone()));
      }
      ExportStatement::Default { keyword_span, local: None, statement_end } => {
        edits.replace(keyword_span.start, keyword_span.end, "const __default = ");
        let statement = &module.code[..*statement_end as usize];
        if !statement.trim_end().ends_with(';') {
          edits.insert(*statement_end, ";");
        }
        getters.push(("default".to_string(), "__default".to_string()));
      }
    }
  }

  for dynamic_import in &syntax.dynamic_imports {
    if !is_external(&dynamic_import.specifier) {
      edits.replace(
        dynamic_import.span.start,
        dynamic_import.span.end,
        format!(
          "Promise.resolve().then(() => __interop(require({})))",
          quote(&dynamic_import.specifier)
        ),
      );
    }
  }

  (edits.apply(&module.code), getters)
}
