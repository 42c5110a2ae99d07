use std::path::{Path, PathBuf};

use arcstr::ArcStr;
use itertools::Itertools;
use oxc_resolver::{ResolveError, ResolveOptions as OxcResolverOptions, NODEJS_BUILTINS};
use sugar_path::SugarPath;

#[derive(Debug, Clone)]
pub struct ResolverOptions {
  pub cwd: PathBuf,
  /// Tried in order for extensionless specifiers, e.g. `[".ts", ".js"]`.
  pub extensions: Vec<String>,
  /// Resolve Node.js builtin names (`fs`, `path`, ...) to `node:` ids instead of looking for a
  /// package with that name in `node_modules`.
  pub prefer_builtins: bool,
}

impl Default for ResolverOptions {
  fn default() -> Self {
    Self {
      cwd: std::env::current_dir().unwrap_or_default(),
      extensions: vec![".js".to_string(), ".ts".to_string()],
      prefer_builtins: false,
    }
  }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ResolveReturn {
  /// Absolute path of the resolved file.
  Path(ArcStr),
  /// A Node.js builtin, as `node:<name>`.
  Builtin(ArcStr),
}

#[derive(Debug)]
pub struct Resolver {
  cwd: PathBuf,
  prefer_builtins: bool,
  import_resolver: oxc_resolver::Resolver,
}

impl Resolver {
  pub fn new(options: ResolverOptions) -> Self {
    let extensions = options
      .extensions
      .into_iter()
      .map(|ext| if ext.starts_with('.') { ext } else { format!(".{ext}") })
      .unique()
      .collect();

    let import_resolver = oxc_resolver::Resolver::new(OxcResolverOptions {
      extensions,
      condition_names: vec!["import".to_string(), "default".to_string()],
      main_fields: vec!["module".to_string(), "main".to_string()],
      builtin_modules: false,
      ..OxcResolverOptions::default()
    });

    Self { cwd: options.cwd, prefer_builtins: options.prefer_builtins, import_resolver }
  }

  pub fn cwd(&self) -> &Path {
    &self.cwd
  }

  pub fn resolve(
    &self,
    importer: Option<&Path>,
    specifier: &str,
  ) -> Result<ResolveReturn, ResolveError> {
    if self.prefer_builtins {
      if let Some(name) = builtin_name(specifier) {
        return Ok(ResolveReturn::Builtin(arcstr::format!("node:{name}")));
      }
    }

    let dir = importer
      .and_then(|importer| importer.parent())
      .filter(|inner| inner.components().next().is_some())
      .unwrap_or(self.cwd.as_path());

    let resolution = self.import_resolver.resolve(dir, specifier)?;
    let path = resolution.full_path().normalize();
    Ok(ResolveReturn::Path(path.to_string_lossy().as_ref().into()))
  }
}

/// The builtin a specifier names, with or without the `node:` prefix. Subpaths such as `fs/promises`
/// count when the root module is a builtin.
fn builtin_name(specifier: &str) -> Option<&str> {
  let name = specifier.strip_prefix("node:").unwrap_or(specifier);
  let root = name.split('/').next().unwrap_or(name);
  (specifier.starts_with("node:") || NODEJS_BUILTINS.contains(&root)).then_some(name)
}

#[test]
fn builtin_names() {
  assert_eq!(builtin_name("fs"), Some("fs"));
  assert_eq!(builtin_name("node:fs/promises"), Some("fs/promises"));
  assert_eq!(builtin_name("fs/promises"), Some("fs/promises"));
  assert_eq!(builtin_name("left-pad"), None);
}

#[test]
fn resolves_packages_and_extensions() {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path().canonicalize().unwrap();
  std::fs::create_dir_all(root.join("src")).unwrap();
  std::fs::write(root.join("src/util.ts"), "export {}").unwrap();
  std::fs::create_dir_all(root.join("node_modules/fs")).unwrap();
  std::fs::write(root.join("node_modules/fs/package.json"), r#"{ "name": "fs", "main": "index.js" }"#)
    .unwrap();
  std::fs::write(root.join("node_modules/fs/index.js"), "module.exports = {}").unwrap();

  let importer = root.join("src/index.ts");
  let resolver = Resolver::new(ResolverOptions {
    cwd: root.clone(),
    extensions: vec![".ts".to_string(), "js".to_string()],
    prefer_builtins: false,
  });

  assert_eq!(
    resolver.resolve(Some(&importer), "./util").unwrap(),
    ResolveReturn::Path(root.join("src/util.ts").to_string_lossy().as_ref().into())
  );
  assert_eq!(
    resolver.resolve(Some(&importer), "fs").unwrap(),
    ResolveReturn::Path(root.join("node_modules/fs/index.js").to_string_lossy().as_ref().into())
  );
  assert!(resolver.resolve(Some(&importer), "./missing").is_err());

  let resolver = Resolver::new(ResolverOptions { cwd: root, prefer_builtins: true, ..ResolverOptions::default() });
  assert_eq!(
    resolver.resolve(Some(&importer), "fs").unwrap(),
    ResolveReturn::Builtin(arcstr::literal!("node:fs"))
  );
}
