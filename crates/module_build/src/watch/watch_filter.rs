use std::path::{Path, PathBuf};

use module_build_common::WatcherOptions;
use rustc_hash::FxHashSet;
use sugar_path::SugarPath;

/// Decides which file-system changes trigger a rebuild.
#[derive(Debug)]
pub struct WatchFilter {
  cwd: PathBuf,
  include: Vec<String>,
  exclude: Vec<String>,
  /// `None` when the bundle is written straight into `cwd`.
  output_dir: Option<PathBuf>,
  /// Files the last pass wrote.
  written: FxHashSet<PathBuf>,
}

impl WatchFilter {
  pub fn new(cwd: &Path, options: &WatcherOptions, output_dir: &Path) -> Self {
    Self {
      cwd: cwd.to_path_buf(),
      include: options.include.clone(),
      exclude: options.exclude.clone(),
      output_dir: (output_dir != cwd).then(|| output_dir.to_path_buf()),
      written: FxHashSet::default(),
    }
  }

  pub fn set_written(&mut self, files: impl IntoIterator<Item = PathBuf>) {
    self.written = files.into_iter().collect();
  }

  pub fn matches(&self, path: &Path) -> bool {
    if self.written.contains(path)
      || self.output_dir.as_ref().is_some_and(|output_dir| path.starts_with(output_dir))
    {
      return false;
    }

    let Ok(relative) = path.strip_prefix(&self.cwd) else {
      return false;
    };
    let relative = relative.to_slash_lossy();

    self.include.iter().any(|glob| fast_glob::glob_match(glob.as_str(), relative.as_ref()))
      && !self.exclude.iter().any(|glob| fast_glob::glob_match(glob.as_str(), relative.as_ref()))
  }
}

#[test]
fn include_exclude_and_output() {
  let options = WatcherOptions {
    include: vec!["src/**".to_string()],
    exclude: vec!["src/**/*.test.ts".to_string()],
    ..WatcherOptions::default()
  };
  let mut filter = WatchFilter::new(Path::new("/project"), &options, Path::new("/project/dist"));

  assert!(filter.matches(Path::new("/project/src/index.ts")));
  assert!(filter.matches(Path::new("/project/src/nested/util.ts")));
  assert!(!filter.matches(Path::new("/project/src/index.test.ts")));
  assert!(!filter.matches(Path::new("/project/package.json")));
  assert!(!filter.matches(Path::new("/elsewhere/src/index.ts")));

  let options = WatcherOptions::default();
  filter = WatchFilter::new(Path::new("/project"), &options, Path::new("/project/dist"));
  assert!(filter.matches(Path::new("/project/package.json")));
  assert!(!filter.matches(Path::new("/project/dist/index.js")));
  assert!(!filter.matches(Path::new("/project/node_modules/left-pad/index.js")));
}

#[test]
fn output_in_cwd_excludes_written_files() {
  let mut filter =
    WatchFilter::new(Path::new("/project"), &WatcherOptions::default(), Path::new("/project"));
  filter.set_written([PathBuf::from("/project/index.js"), PathBuf::from("/project/index.js.map")]);

  assert!(!filter.matches(Path::new("/project/index.js")));
  assert!(!filter.matches(Path::new("/project/index.js.map")));
  assert!(filter.matches(Path::new("/project/index.ts")));
}
