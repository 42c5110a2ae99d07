use arcstr::ArcStr;
use indexmap::IndexMap;
use module_build_common::{ModuleFormat, ModuleId, ModuleIdx};
use module_build_ecmascript::ModuleSyntax;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
  /// `import`, `export ... from` and `require`.
  Static,
  /// `import()`
  Dynamic,
}

#[derive(Debug, Clone, Copy)]
pub struct Dependency {
  pub idx: ModuleIdx,
  pub kind: ImportKind,
}

#[derive(Debug)]
pub struct NormalModule {
  pub idx: ModuleIdx,
  pub id: ModuleId,
  /// Path relative to `cwd`, used as the key of the module in the bundle.
  pub stable_id: String,
  pub is_entry: bool,
  /// The code after every `transform` hook ran.
  pub code: ArcStr,
  /// Source map JSON of `code`.
  pub map: Option<String>,
  pub format: ModuleFormat,
  pub syntax: ModuleSyntax,
  /// Keyed by specifier, in source order.
  pub dependencies: IndexMap<String, Dependency>,
}

#[derive(Debug)]
pub struct ExternalModule {
  pub idx: ModuleIdx,
  /// The specifier the module is imported with.
  pub name: ArcStr,
}

#[derive(Debug)]
pub enum Module {
  Normal(Box<NormalModule>),
  External(ExternalModule),
}

impl Module {
  /// The key the module is registered under in the rendered bundle.
  pub fn key(&self) -> &str {
    match self {
      Module::Normal(module) => &module.stable_id,
      Module::External(module) => &module.name,
    }
  }

  pub fn as_normal(&self) -> Option<&NormalModule> {
    match self {
      Module::Normal(module) => Some(module),
      Module::External(_) => None,
    }
  }

  pub fn is_external(&self) -> bool {
    matches!(self, Module::External(_))
  }
}
