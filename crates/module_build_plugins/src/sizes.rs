use std::{borrow::Cow, path::Path};

use indexmap::IndexMap;
use module_build_common::RenderedModule;
use module_build_plugin::{HookGenerateBundleArgs, HookNoopReturn, Plugin, PluginContext};

const CODEBASE: &str = "codebase";

#[derive(Debug, Default, Clone)]
pub struct SizesOptions {
  /// Also list every module of a bucket.
  pub details: bool,
}

/// Reports how much each package contributes to the bundle.
#[derive(Debug, Default)]
pub struct SizesPlugin {
  options: SizesOptions,
}

impl SizesPlugin {
  pub fn new(options: SizesOptions) -> Self {
    Self { options }
  }
}

impl Plugin for SizesPlugin {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("sizes")
  }

  fn generate_bundle(
    &self,
    ctx: &PluginContext,
    args: &mut HookGenerateBundleArgs<'_>,
  ) -> HookNoopReturn {
    for line in report(&args.chunk.filename, &args.chunk.modules, ctx.cwd(), self.options.details) {
      ctx.info(&line);
    }
    Ok(())
  }
}

/// The package a module belongs to, or `codebase` for the package's own files.
fn bucket(id: &str) -> &str {
  let Some((_, rest)) = id.rsplit_once("node_modules/") else { return CODEBASE };
  let mut segments = rest.splitn(3, '/');
  match (segments.next(), segments.next()) {
    (Some(scope), Some(name)) if scope.starts_with('@') => &rest[..scope.len() + 1 + name.len()],
    (Some(name), _) => name,
    _ => CODEBASE,
  }
}

fn report(filename: &str, modules: &[RenderedModule], cwd: &Path, details: bool) -> Vec<String> {
  let mut buckets: IndexMap<&str, Vec<&RenderedModule>> = IndexMap::new();
  for module in modules {
    buckets.entry(bucket(&module.id)).or_default().push(module);
  }

  let total = modules.iter().map(|module| module.rendered_length).sum::<usize>();
  let mut buckets = buckets
    .into_iter()
    .map(|(name, modules)| {
      (name, modules.iter().map(|module| module.rendered_length).sum::<usize>(), modules)
    })
    .collect::<Vec<_>>();
  buckets.sort_by(|(_, a, _), (_, b, _)| b.cmp(a));

  let mut lines = vec![format!("Sizes for {filename}:")];
  for (name, size, mut modules) in buckets {
    lines.push(format!("{name} - {} ({})", kilobytes(size), percent(size, total)));
    if details {
      modules.sort_by(|a, b| b.rendered_length.cmp(&a.rendered_length));
      for module in modules {
        lines.push(format!(
          "  {} - {} ({})",
          module.id.stabilize(cwd),
          kilobytes(module.rendered_length),
          percent(module.rendered_length, size)
        ));
      }
    }
  }
  lines
}

#[allow(clippy::cast_precision_loss)]
fn kilobytes(bytes: usize) -> String {
  format!("{:.2} kB", bytes as f64 / 1024.0)
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: usize, total: usize) -> String {
  if total == 0 {
    return "0.00%".to_string();
  }
  format!("{:.2}%", part as f64 * 100.0 / total as f64)
}

#[test]
fn buckets_by_package() {
  assert_eq!(bucket("/p/src/index.ts"), "codebase");
  assert_eq!(bucket("/p/node_modules/left-pad/index.js"), "left-pad");
  assert_eq!(bucket("/p/node_modules/@scope/pkg/lib/a.js"), "@scope/pkg");
  assert_eq!(bucket("/p/node_modules/a/node_modules/b/index.js"), "b");
}

#[test]
fn report_with_details() {
  use module_build_common::ModuleId;

  let modules = [("/p/src/index.ts", 1024), ("/p/node_modules/left-pad/index.js", 3072), ("/p/src/util.ts", 2048)]
    .into_iter()
    .map(|(id, rendered_length)| RenderedModule { id: ModuleId::from(id), rendered_length })
    .collect::<Vec<_>>();

  assert_eq!(
    report("index.js", &modules, Path::new("/p"), true),
    vec![
      "Sizes for index.js:",
      "codebase - 3.00 kB (50.00%)",
      "  src/util.ts - 2.00 kB (66.67%)",
      "  src/index.ts - 1.00 kB (33.33%)",
      "left-pad - 3.00 kB (50.00%)",
      "  node_modules/left-pad/index.js - 3.00 kB (100.00%)",
    ]
  );
  assert_eq!(report("index.js", &modules, Path::new("/p"), false).len(), 3);
}
