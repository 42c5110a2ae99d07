mod auto_external;
mod commonjs;
mod delete;
mod node_resolve;
mod sizes;
mod typescript;

pub use crate::{
  auto_external::AutoExternalPlugin,
  commonjs::CommonJsPlugin,
  delete::{DeleteOptions, DeletePlugin},
  node_resolve::{NodeResolveOptions, NodeResolvePlugin},
  sizes::{SizesOptions, SizesPlugin},
  typescript::{TypeScriptOptions, TypeScriptPlugin},
};
pub use module_build_ecmascript::ESTarget;

/// Whether `id` ends with one of `extensions` (given without the dot).
fn has_extension(id: &str, extensions: &[&str]) -> bool {
  std::path::Path::new(id)
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| extensions.contains(&ext))
}

/// Several diagnostics of one module as a single hook error.
fn join_errors(errors: &[anyhow::Error]) -> anyhow::Error {
  anyhow::anyhow!(itertools::join(errors.iter().map(|error| format!("{error:#}")), "\n"))
}
