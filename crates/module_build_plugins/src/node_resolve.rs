use std::{borrow::Cow, path::Path, sync::OnceLock};

use module_build_plugin::{
  HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, Plugin, PluginContext,
};
use module_build_resolver::{ResolveReturn, Resolver, ResolverOptions};

#[derive(Debug, Clone)]
pub struct NodeResolveOptions {
  pub extensions: Vec<String>,
  pub prefer_builtins: bool,
}

impl Default for NodeResolveOptions {
  fn default() -> Self {
    Self {
      extensions: [".mjs", ".js", ".json", ".node"].into_iter().map(String::from).collect(),
      prefer_builtins: true,
    }
  }
}

/// Node.js module resolution: extensions, `package.json` fields and `node_modules` lookup.
#[derive(Debug)]
pub struct NodeResolvePlugin {
  options: NodeResolveOptions,
  resolver: OnceLock<Resolver>,
}

impl NodeResolvePlugin {
  pub fn new(options: NodeResolveOptions) -> Self {
    Self { options, resolver: OnceLock::new() }
  }

  fn resolver(&self, cwd: &Path) -> &Resolver {
    self.resolver.get_or_init(|| {
      Resolver::new(ResolverOptions {
        cwd: cwd.to_path_buf(),
        extensions: self.options.extensions.clone(),
        prefer_builtins: self.options.prefer_builtins,
      })
    })
  }
}

impl Plugin for NodeResolvePlugin {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("node-resolve")
  }

  fn resolve_id(&self, ctx: &PluginContext, args: &HookResolveIdArgs<'_>) -> HookResolveIdReturn {
    let is_bare_entry = args.is_entry
      && !args.specifier.starts_with('.')
      && !Path::new(args.specifier).is_absolute();
    let specifier = if is_bare_entry {
      Cow::Owned(format!("./{}", args.specifier))
    } else {
      Cow::Borrowed(args.specifier)
    };

    match self.resolver(ctx.cwd()).resolve(args.importer.map(Path::new), &specifier) {
      Ok(ResolveReturn::Path(id)) => Ok(Some(HookResolveIdOutput { id, external: false })),
      Ok(ResolveReturn::Builtin(id)) => Ok(Some(HookResolveIdOutput { id, external: true })),
      Err(error) => {
        log::debug!("{} not resolved: {error}", args.specifier);
        Ok(None)
      }
    }
  }
}

#[test]
fn resolves_extensionless_imports_and_the_entry() {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path().canonicalize().unwrap();
  std::fs::create_dir_all(root.join("src")).unwrap();
  std::fs::write(root.join("src/index.ts"), "").unwrap();
  std::fs::write(root.join("src/util.ts"), "").unwrap();

  let plugin = NodeResolvePlugin::new(NodeResolveOptions {
    extensions: vec![".ts".to_string(), ".js".to_string()],
    prefer_builtins: false,
  });
  let ctx = PluginContext::new(root.clone(), None, plugin.name());
  let importer = root.join("src/index.ts").to_string_lossy().into_owned();

  let entry = plugin
    .resolve_id(&ctx, &HookResolveIdArgs { importer: None, specifier: "src/index.ts", is_entry: true })
    .unwrap();
  assert_eq!(entry, Some(HookResolveIdOutput { id: importer.as_str().into(), external: false }));

  let util = plugin
    .resolve_id(
      &ctx,
      &HookResolveIdArgs { importer: Some(&importer), specifier: "./util", is_entry: false },
    )
    .unwrap();
  let expected = root.join("src/util.ts").to_string_lossy().into_owned();
  assert_eq!(util, Some(HookResolveIdOutput { id: expected.as_str().into(), external: false }));

  let missing = plugin
    .resolve_id(
      &ctx,
      &HookResolveIdArgs { importer: Some(&importer), specifier: "./missing", is_entry: false },
    )
    .unwrap();
  assert_eq!(missing, None);
}
