use std::{
  borrow::Cow,
  path::{Path, PathBuf},
  sync::atomic::{AtomicBool, Ordering},
};

use anyhow::Context;
use module_build_plugin::{HookNoopReturn, Plugin, PluginContext};
use sugar_path::SugarPath;
use walkdir::WalkDir;

#[derive(Debug, Default, Clone)]
pub struct DeleteOptions {
  /// Globs relative to `cwd`, e.g. `dist/*`.
  pub targets: Vec<String>,
  /// Only delete on the first `build_start`, not on watch rebuilds.
  pub run_once: bool,
}

/// Removes previous build output before anything else runs.
#[derive(Debug)]
pub struct DeletePlugin {
  options: DeleteOptions,
  has_run: AtomicBool,
}

impl DeletePlugin {
  pub fn new(options: DeleteOptions) -> Self {
    Self { options, has_run: AtomicBool::new(false) }
  }
}

impl Plugin for DeletePlugin {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("delete")
  }

  fn build_start(&self, ctx: &PluginContext) -> HookNoopReturn {
    if self.has_run.swap(true, Ordering::SeqCst) && self.options.run_once {
      return Ok(());
    }

    for path in matching_paths(ctx.cwd(), &self.options.targets) {
      if path.is_dir() {
        std::fs::remove_dir_all(&path)
      } else {
        std::fs::remove_file(&path)
      }
      .with_context(|| format!("Failed to delete {}", path.display()))?;
      log::debug!("deleted {}", path.display());
    }
    Ok(())
  }
}

/// Paths below `cwd` matching any of `targets`. A matched directory is returned whole, without its
/// contents.
fn matching_paths(cwd: &Path, targets: &[String]) -> Vec<PathBuf> {
  let mut matched = vec![];
  for target in targets {
    let base = cwd.join(glob_base(target));
    if !base.exists() {
      continue;
    }

    let mut walker = WalkDir::new(&base).into_iter();
    while let Some(entry) = walker.next() {
      let Ok(entry) = entry else { continue };
      let Ok(relative) = entry.path().strip_prefix(cwd) else { continue };
      let relative = relative.to_slash_lossy();

      if fast_glob::glob_match(target.as_str(), relative.as_ref()) {
        if entry.file_type().is_dir() {
          walker.skip_current_dir();
        }
        if !matched.iter().any(|path: &PathBuf| entry.path().starts_with(path)) {
          matched.push(entry.path().to_path_buf());
        }
      }
    }
  }
  matched
}

/// The leading directories of a glob that contain no pattern characters.
fn glob_base(glob: &str) -> PathBuf {
  glob
    .split('/')
    .take_while(|segment| !segment.contains(['*', '?', '[', '{', '!']))
    .collect::<PathBuf>()
}

#[test]
fn glob_base_stops_at_patterns() {
  assert_eq!(glob_base("dist/*"), PathBuf::from("dist"));
  assert_eq!(glob_base("out/types/**/*.d.ts"), PathBuf::from("out/types"));
  assert_eq!(glob_base("*.log"), PathBuf::new());
}

#[test]
fn deletes_matches_once() {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path();
  std::fs::create_dir_all(root.join("dist/nested")).unwrap();
  std::fs::write(root.join("dist/old.js"), "").unwrap();
  std::fs::write(root.join("dist/nested/old.d.ts"), "").unwrap();
  std::fs::create_dir_all(root.join("src")).unwrap();
  std::fs::write(root.join("src/index.ts"), "").unwrap();

  let plugin =
    DeletePlugin::new(DeleteOptions { targets: vec!["dist/*".to_string()], run_once: true });
  let ctx = PluginContext::new(root.to_path_buf(), None, plugin.name());

  plugin.build_start(&ctx).unwrap();
  assert!(root.join("dist").is_dir());
  assert_eq!(std::fs::read_dir(root.join("dist")).unwrap().count(), 0);
  assert!(root.join("src/index.ts").exists());

  std::fs::write(root.join("dist/new.js"), "").unwrap();
  plugin.build_start(&ctx).unwrap();
  assert!(root.join("dist/new.js").exists());
}
